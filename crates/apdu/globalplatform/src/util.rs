//! Common utilities for GlobalPlatform operations

pub mod tlv {
    //! Simple-TLV lookups over card responses

    use bytes::Bytes;
    use iso7816_tlv::simple::Tlv;

    /// Find the value of the first top-level TLV carrying `tag`
    ///
    /// Parsing stops at the first malformed object.
    pub fn find_tlv_value(data: &[u8], tag: u8) -> Option<Bytes> {
        let mut rest = data;

        while !rest.is_empty() {
            let (parsed, remaining) = Tlv::parse(rest);
            let tlv = parsed.ok()?;

            let tlv_tag: u8 = tlv.tag().into();
            if tlv_tag == tag {
                return Some(Bytes::copy_from_slice(tlv.value()));
            }
            rest = remaining;
        }

        None
    }
}
