use crate::base::neterror::NetError;

#[test]
fn test_net_error_roundtrip() {
    // Standard Chromium error
    let original = NetError::NameNotResolved;
    let code = original.as_i32();
    assert_eq!(code, -105);
    let converted = NetError::from(code);
    assert!(matches!(converted, NetError::NameNotResolved));

    // Custom error
    let custom = NetError::ResolverDestroyed;
    let custom_code = custom.as_i32();
    assert_eq!(custom_code, -901);
    let custom_converted = NetError::from(custom_code);
    assert!(matches!(custom_converted, NetError::ResolverDestroyed));
}

#[test]
fn test_unknown_error() {
    let err = NetError::from(-9999);
    assert!(matches!(err, NetError::Unknown(-9999)));
    assert_eq!(err.code(), "EUNKNOWN");
}

#[test]
fn test_contextual_error_shares_code() {
    let err = NetError::dns_failed(
        "nonexistent.invalid",
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such host"),
    );
    assert_eq!(err.as_i32(), NetError::NameNotResolved.as_i32());
    assert_eq!(err.code(), "ENOTFOUND");
    assert_eq!(err.domain(), Some("nonexistent.invalid"));
    assert!(err.to_string().contains("nonexistent.invalid"));
}

#[test]
fn test_no_data_code() {
    assert_eq!(NetError::NoData.code(), "ENODATA");
    assert!(NetError::NoData.domain().is_none());
}

#[test]
fn test_timeout_code() {
    let err = NetError::from(-118);
    assert!(matches!(err, NetError::ConnectionTimedOut));
    assert_eq!(err.code(), "ETIMEOUT");
}
