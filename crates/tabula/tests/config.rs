// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Codec configuration: YAML loading and its effect on built codecs.

#![cfg(feature = "config-loaders")]

use std::io::Write;
use tabula::config::CodecConfig;
use tabula::{DataType, Decimal, Error, Record, TypedEncoder};

#[derive(Debug, PartialEq, Record)]
struct Invoice {
    number: i64,
    total: Decimal,
    offset: i32,
}

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(yaml.as_bytes()).expect("write config");
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_config(
        "decimal:\n  precision: 10\n  scale: 2\nreserved_field_names:\n  - offset\n",
    );
    let config = CodecConfig::load_from_file(file.path()).expect("load");
    assert_eq!(config.decimal.precision, 10);
    assert_eq!(config.decimal.scale, 2);
    assert!(config.check_reserved_names);
    assert!(config.is_extra_reserved("offset"));
}

#[test]
fn test_extra_reserved_names_apply() {
    let config = CodecConfig::from_yaml_str("reserved_field_names: [offset]\n").expect("config");
    match TypedEncoder::<Invoice>::with_config(&config) {
        Err(Error::ReservedFieldName { name, .. }) => assert_eq!(name, "offset"),
        other => panic!("Expected ReservedFieldName, got {:?}", other.map(|_| ())),
    }
    assert!(TypedEncoder::<Invoice>::new().is_ok());
}

#[test]
fn test_decimal_layout_applies() {
    let config = CodecConfig::from_yaml_str("decimal: { precision: 10, scale: 2 }\n")
        .expect("config");
    let encoder = TypedEncoder::<Invoice>::with_config(&config).expect("encoder");
    assert_eq!(
        encoder.schema()[1].data_type,
        DataType::Decimal {
            precision: 10,
            scale: 2
        }
    );

    let invoice = Invoice {
        number: 1,
        total: Decimal::new(1999, 2),
        offset: 0,
    };
    let row = encoder.encode(&invoice).expect("encode");
    assert_eq!(encoder.decode(&row).expect("decode"), invoice);

    let too_big = Invoice {
        total: Decimal::from_i128(100_000_000_000),
        ..invoice
    };
    assert!(matches!(
        encoder.encode(&too_big),
        Err(Error::DecimalOverflow { precision: 10, scale: 2, .. })
    ));
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(matches!(
        CodecConfig::from_yaml_str("decimal: { precision: 4, scale: 6 }\n"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        CodecConfig::from_yaml_str("decimal: [1, 2]\n"),
        Err(Error::Config(_))
    ));
    assert!(matches!(
        CodecConfig::load_from_file("/nonexistent/tabula.yaml"),
        Err(Error::Config(_))
    ));
}
