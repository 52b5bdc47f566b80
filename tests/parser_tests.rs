mod common;

use common::{CP_ACCEPT, CP_NO_TIMEZONE, HW_TEARDOWN};
use fwlog_parser::fwlog::{
    CheckPointVariant, Classified, HuaweiVariant, LogVariant, VariantRegistry,
};

#[test]
fn test_huawei_session_teardown() {
    let record = HuaweiVariant::new(2020).parse(HW_TEARDOWN).unwrap();

    assert_eq!(record.get("_timestamp"), Some("20200909115641"));
    assert_eq!(record.get("_datetime"), Some("2020-09-09 11:56:41"));
    assert_eq!(record.get("_interface_1"), Some("10.123.169.1"));
    assert_eq!(record.get("_interface_2"), Some("FW-OUT-01"));
    assert_eq!(record.get("_event_name"), Some("SESSION_TEARDOWN"));
    assert_eq!(record.get("_event_brace_round"), Some("l"));

    let expected = [
        ("IPVer", "4"),
        ("Protocol", "udp"),
        ("SourceIP", "10.123.169.167"),
        ("DestinationIP", "8.8.8.8"),
        ("SourcePort", "52451"),
        ("DestinationPort", "53"),
        ("PolicyName", "Permit_all"),
        ("CloseReason", "aged-out"),
    ];
    for (key, value) in expected {
        assert_eq!(record.get(key), Some(value), "field {key}");
    }
    // 系统字段 + 尾部字段，没有多余字段
    assert_eq!(record.len(), HuaweiVariant::new(2020).system_fields().len() + expected.len());
}

#[test]
fn test_fallback_year_is_configurable() {
    let record = HuaweiVariant::new(2023).parse(HW_TEARDOWN).unwrap();
    assert_eq!(record.get("_timestamp"), Some("20230909115641"));
}

#[test]
fn test_checkpoint_quoted_pairs() {
    let record = CheckPointVariant::new(2020).parse(CP_ACCEPT).unwrap();

    assert_eq!(record.get("_timestamp"), Some("20200910081502"));
    assert_eq!(record.get("_timezone"), Some("+02:00"));
    assert_eq!(record.get("time"), Some("1599718502"));
    assert_eq!(record.get("action"), Some("Accept"));
    assert_eq!(record.get("orig"), Some("10.1.1.1"));
    assert_eq!(record.get("product"), Some("VPN-1 & FireWall-1"));
    assert_eq!(record.get("service"), Some("443"));
}

#[test]
fn test_checkpoint_without_timezone_is_leftover() {
    assert!(CheckPointVariant::new(2020).parse(CP_NO_TIMEZONE).is_err());

    let registry = VariantRegistry::from_names(&["hw", "cp"], 2020).unwrap();
    assert_eq!(
        registry.classify(CP_NO_TIMEZONE),
        Classified::Leftover(CP_NO_TIMEZONE.to_string())
    );
}

#[test]
fn test_each_line_matches_exactly_one_variant_or_none() {
    let hw = HuaweiVariant::new(2020);
    let cp = CheckPointVariant::new(2020);

    for line in [HW_TEARDOWN, CP_ACCEPT, CP_NO_TIMEZONE, "", "   "] {
        let matches = [hw.parse(line).is_ok(), cp.parse(line).is_ok()]
            .iter()
            .filter(|ok| **ok)
            .count();
        assert!(matches <= 1, "line matched by several variants: {line}");
    }
}

#[test]
fn test_priority_order_decides_winner() {
    let registry = VariantRegistry::from_names(&["cp", "hw"], 2020).unwrap();
    match registry.classify(HW_TEARDOWN) {
        Classified::Matched { variant, record } => {
            assert_eq!(registry.get(variant).map(|v| v.name()), Some("hw"));
            assert_eq!(record.get("Protocol"), Some("udp"));
        }
        other => panic!("unexpected classification: {other:?}"),
    }
}

#[test]
fn test_registry_rejects_reserved_name() {
    let err = VariantRegistry::from_names(&["hw", "na"], 2020).unwrap_err();
    assert!(err.is_config_error());
}
