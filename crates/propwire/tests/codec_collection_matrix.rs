use std::collections::{BTreeSet, HashMap, VecDeque};

use propwire::{CodecError, Decoder, Encoder, MemoryBag, PropertyBag, PropertyValue};

#[test]
fn absent_sequence_is_distinct_from_empty() {
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_strings::<&str>("missing", None).unwrap();
    enc.encode_strings::<&str>("empty", Some(&[])).unwrap();

    assert!(!bag.contains("missingCount"));
    assert_eq!(bag.get_int("emptyCount").unwrap(), 0);

    let dec = Decoder::new(&bag);
    assert_eq!(
        dec.decode_sequence::<String, _>("missing", vec!["keep".to_owned()])
            .unwrap(),
        None
    );
    assert_eq!(
        dec.decode_strings("empty", Vec::new()).unwrap(),
        Some(Vec::new())
    );
}

#[test]
fn sequence_layout_uses_prefix_index_keys() {
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_sequence("ids", Some(&[10i64, 20, 30][..])).unwrap();

    assert_eq!(bag.keys(), vec!["ids0", "ids1", "ids2", "idsCount"]);
    assert_eq!(bag.get_long("ids1").unwrap(), 20);
    assert_eq!(bag.get_int("idsCount").unwrap(), 3);
}

#[test]
fn sequence_decodes_into_any_extendable_container() {
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_sequence("n", Some(&[3i32, 1, 3, 2][..])).unwrap();

    let dec = Decoder::new(&bag);
    let set = dec.decode_sequence::<i32, _>("n", BTreeSet::new()).unwrap();
    assert_eq!(set, Some(BTreeSet::from([1, 2, 3])));
    let deque = dec.decode_sequence::<i32, _>("n", VecDeque::new()).unwrap();
    assert_eq!(deque, Some(VecDeque::from([3, 1, 3, 2])));
}

#[test]
fn per_element_nulls_survive_roundtrip() {
    let values = [Some("a".to_owned()), None, Some(String::new()), None];
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_sequence("opt", Some(&values[..])).unwrap();
    assert!(!bag.contains("opt1"));
    assert!(!bag.contains("opt3"));

    let dec = Decoder::new(&bag);
    let decoded = dec
        .decode_sequence::<Option<String>, _>("opt", Vec::new())
        .unwrap();
    assert_eq!(decoded, Some(values.to_vec()));
}

#[test]
fn mixed_type_map_roundtrip() {
    let pairs = vec![
        (PropertyValue::Str("name".into()), PropertyValue::Str("widget".into())),
        (PropertyValue::Int(7), PropertyValue::Bool(true)),
        (PropertyValue::Long(1 << 40), PropertyValue::Double(2.5)),
        (PropertyValue::Bool(false), PropertyValue::Bytes(vec![9, 9])),
    ];
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_map_default_key("attr", Some(pairs.iter().map(|(k, v)| (k, v))))
        .unwrap();

    assert_eq!(bag.get_int("attrCount").unwrap(), 4);
    assert_eq!(bag.get_int("attr1.Key").unwrap(), 7);
    assert!(bag.get_bool("attr1.Value").unwrap());

    let dec = Decoder::new(&bag);
    let decoded = dec.decode_map_default_key("attr").unwrap().unwrap();
    let expected: HashMap<_, _> = pairs.into_iter().collect();
    assert_eq!(decoded, expected);
}

#[test]
fn typed_map_with_custom_key_field() {
    let mut limits: HashMap<String, i64> = HashMap::new();
    limits.insert("cpu".into(), 4);
    limits.insert("mem".into(), 8 << 30);

    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_map("limit", "Resource", Some(&limits)).unwrap();
    assert!(bag.contains("limit0.Resource"));
    assert!(!bag.contains("limit0.Key"));

    let dec = Decoder::new(&bag);
    let decoded = dec
        .decode_map_as::<String, i64>("limit", "Resource")
        .unwrap();
    assert_eq!(decoded, Some(limits));
}

#[test]
fn map_absent_empty_and_duplicate_keys() {
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_map_default_key::<String, String, &HashMap<String, String>>("none", None)
        .unwrap();
    let dup = [(1i32, "first".to_owned()), (1i32, "second".to_owned())];
    enc.encode_map("dup", "Key", Some(dup.iter().map(|(k, v)| (k, v))))
        .unwrap();
    let empty: HashMap<i32, i32> = HashMap::new();
    enc.encode_map("empty", "Key", Some(&empty)).unwrap();

    let dec = Decoder::new(&bag);
    assert_eq!(dec.decode_map("none", "Key").unwrap(), None);
    assert_eq!(dec.decode_map("empty", "Key").unwrap(), Some(HashMap::new()));
    let decoded = dec.decode_map_as::<i32, String>("dup", "Key").unwrap().unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[&1], "second");
}

#[test]
fn null_map_value_decodes_as_null() {
    let pairs = [("gone".to_owned(), None::<i32>), ("here".to_owned(), Some(1))];
    let mut bag = MemoryBag::new();
    let mut enc = Encoder::new(&mut bag);
    enc.encode_map("m", "Key", Some(pairs.iter().map(|(k, v)| (k, v))))
        .unwrap();
    assert!(!bag.contains("m0.Value"));

    let dec = Decoder::new(&bag);
    let decoded = dec.decode_map("m", "Key").unwrap().unwrap();
    assert_eq!(decoded[&PropertyValue::from("gone")], PropertyValue::Null);
    assert_eq!(decoded[&PropertyValue::from("here")], PropertyValue::Int(1));
}

#[test]
fn typed_sequence_rejects_wrong_element_type() {
    let mut bag = MemoryBag::new();
    bag.set_int("xCount", 2).unwrap();
    bag.set_long("x0", 1).unwrap();
    bag.set_string("x1", "2").unwrap();

    let dec = Decoder::new(&bag);
    let err = dec.decode_sequence::<i64, _>("x", Vec::new()).unwrap_err();
    assert_eq!(
        err,
        CodecError::TypeMismatch {
            key: "x1".into(),
            expected: "long".into(),
            found: "string".into(),
        }
    );
}
