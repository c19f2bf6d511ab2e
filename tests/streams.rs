use javaserial::dump::dump_to_string;
use javaserial::serialization::*;
use std::sync::Arc;

const HEADER: [u8; 4] = [0xAC, 0xED, 0x00, 0x05];

fn utf(value: &str) -> Vec<u8> {
    let mut bytes = (value.len() as u16).to_be_bytes().to_vec();
    bytes.extend_from_slice(value.as_bytes());
    bytes
}

fn string(value: &str) -> Vec<u8> {
    [vec![TC_STRING], utf(value)].concat()
}

fn reference(handle: u32) -> Vec<u8> {
    [vec![TC_REFERENCE], handle.to_be_bytes().to_vec()].concat()
}

fn primitive_field(code: u8, name: &str) -> Vec<u8> {
    [vec![code], utf(name)].concat()
}

fn object_field(name: &str, signature: &str) -> Vec<u8> {
    [vec![b'L'], utf(name), string(signature)].concat()
}

fn class_desc(name: &str, uid: i64, flags: u8, fields: &[Vec<u8>], super_class: Vec<u8>) -> Vec<u8> {
    let mut bytes = vec![TC_CLASSDESC];
    bytes.extend(utf(name));
    bytes.extend(uid.to_be_bytes());
    bytes.push(flags);
    bytes.extend((fields.len() as u16).to_be_bytes());
    for field in fields {
        bytes.extend(field);
    }
    bytes.push(TC_ENDBLOCKDATA);
    bytes.extend(super_class);
    bytes
}

const SERIALIZABLE: u8 = 0x02;

/// `Leaf extends Middle extends Base`, where `Base { int a; }`, `Middle {}`, `Leaf { short c; }`
///
/// Handles: `Leaf` 0x7E0000, `Middle` 0x7E0001, `Base` 0x7E0002.
fn hierarchy_class() -> Vec<u8> {
    let base = class_desc(
        "Base",
        1,
        SERIALIZABLE,
        &[primitive_field(b'I', "a")],
        vec![TC_NULL],
    );
    let middle = class_desc("Middle", 2, SERIALIZABLE, &[], base);
    class_desc(
        "Leaf",
        3,
        SERIALIZABLE,
        &[primitive_field(b'S', "c")],
        middle,
    )
}

/// One `Leaf` instance with `a = 7` and `c = 9`
fn hierarchy_stream() -> Vec<u8> {
    [
        HEADER.to_vec(),
        vec![TC_OBJECT],
        hierarchy_class(),
        7i32.to_be_bytes().to_vec(),
        9i16.to_be_bytes().to_vec(),
    ]
    .concat()
}

fn only_object(stream: &SerializedStream) -> &Object {
    match &stream.contents[..] {
        [Content::Object(object)] => object,
        other => panic!("unexpected contents {:?}", other),
    }
}

#[test]
fn class_data_is_ancestor_first() {
    let bytes = hierarchy_stream();
    let stream = SerializedStream::decode(&bytes).unwrap();
    let object = only_object(&stream);

    assert_eq!(object.handle, Handle(0x7E0003));
    assert_eq!(object.class_data.len(), 3);
    assert_eq!(object.class_data[0].values, vec![FieldValue::Int(7)]);
    assert!(object.class_data[1].values.is_empty());
    assert_eq!(object.class_data[2].values, vec![FieldValue::Short(9)]);

    assert_eq!(stream.encode().unwrap(), bytes);
}

#[test]
fn first_descriptor_gets_base_handle() {
    let bytes = hierarchy_stream();
    let stream = SerializedStream::decode(&bytes).unwrap();
    let leaf = match &only_object(&stream).class_pointer {
        ClassPointer::ClassDesc(desc) => desc.clone(),
        other => panic!("unexpected class {:?}", other),
    };
    assert_eq!(leaf.handle, Handle::BASE);
    assert_eq!(leaf.class_name, JavaString::from("Leaf"));

    let middle = match &leaf.super_class {
        ClassPointer::ClassDesc(desc) => desc.clone(),
        other => panic!("unexpected super class {:?}", other),
    };
    assert_eq!(middle.handle, Handle(0x7E0001));
    assert!(middle.fields.is_empty());
}

#[test]
fn class_chain_is_bounded() {
    let bytes = hierarchy_stream();
    let mut settings = Settings::new();
    settings.max_class_depth = 2;
    assert!(matches!(
        SerializedStream::decode_with(&bytes, settings),
        Err(Error::ClassChainTooDeep { limit: 2, .. })
    ));

    let mut settings = Settings::new();
    settings.max_class_depth = 3;
    assert!(SerializedStream::decode_with(&bytes, settings).is_ok());
}

#[test]
fn null_class_consumes_two_bytes() {
    let bytes = [HEADER.to_vec(), vec![TC_OBJECT, TC_NULL, TC_NULL]].concat();
    let stream = SerializedStream::decode(&bytes).unwrap();
    assert_eq!(stream.contents.len(), 2);
    match &stream.contents[0] {
        Content::Object(object) => {
            assert_eq!(object.handle, Handle::BASE);
            assert!(object.class_pointer.is_null());
            assert!(object.class_data.is_empty());
        }
        other => panic!("unexpected record {:?}", other),
    }
    assert_eq!(stream.contents[1], Content::Null);
    assert_eq!(stream.encode().unwrap(), bytes);
}

#[test]
fn back_referenced_class_resolves_to_the_same_bag() {
    let bytes = [
        hierarchy_stream(),
        vec![TC_OBJECT],
        reference(0x7E0000),
        (-1i32).to_be_bytes().to_vec(),
        (-2i16).to_be_bytes().to_vec(),
    ]
    .concat();
    let (stream, handles) = SerializedStream::decode_with_handles(&bytes, Settings::new()).unwrap();
    assert_eq!(stream.contents.len(), 2);

    let (first, second) = match &stream.contents[..] {
        [Content::Object(first), Content::Object(second)] => (first, second),
        other => panic!("unexpected contents {:?}", other),
    };
    assert_eq!(second.handle, Handle(0x7E0004));
    assert_eq!(second.class_pointer, ClassPointer::Reference(Handle::BASE));
    assert_eq!(
        second.class_data[0].values,
        vec![FieldValue::Int(-1)],
        "ancestor data comes first through references too"
    );

    let inline_bag = ClassBag::resolve(&first.class_pointer, &handles, 256).unwrap();
    let referenced_bag = ClassBag::resolve(&second.class_pointer, &handles, 256).unwrap();
    assert_eq!(inline_bag.len(), 3);
    assert_eq!(inline_bag.classes(), referenced_bag.classes());
    for (inline, referenced) in inline_bag.classes().iter().zip(referenced_bag.classes()) {
        assert!(Arc::ptr_eq(inline, referenced));
    }

    assert_eq!(stream.encode().unwrap(), bytes);
}

#[test]
fn unresolvable_reference_is_rejected() {
    let bytes = [HEADER.to_vec(), vec![TC_OBJECT], reference(0x7E0005)].concat();
    match SerializedStream::decode(&bytes) {
        Err(Error::UnresolvedHandle {
            offset: 5,
            handle: Handle(0x7E0005),
            found: None,
            ..
        }) => (),
        other => panic!("unexpected result {:?}", other),
    }

    // A string is no class descriptor
    let bytes = [
        HEADER.to_vec(),
        string("x"),
        vec![TC_OBJECT],
        reference(0x7E0000),
    ]
    .concat();
    assert!(matches!(
        SerializedStream::decode(&bytes),
        Err(Error::UnresolvedHandle {
            found: Some(RecordKind::String),
            ..
        })
    ));
}

#[test]
fn every_truncation_is_rejected() {
    let bytes = hierarchy_stream();
    for length in 0..bytes.len() {
        match SerializedStream::decode(&bytes[..length]) {
            Err(Error::UnexpectedEndOfStream { .. }) => (),
            other => panic!("prefix of {} bytes gave {:?}", length, other),
        }
    }
}

#[test]
fn reset_clears_handles() {
    let bytes = [
        HEADER.to_vec(),
        string("a"),
        vec![TC_RESET],
        string("b"),
        reference(0x7E0000),
    ]
    .concat();
    let (stream, handles) = SerializedStream::decode_with_handles(&bytes, Settings::new()).unwrap();
    match &stream.contents[2] {
        Content::String(record) => assert_eq!(record.handle, Handle::BASE),
        other => panic!("unexpected record {:?}", other),
    }
    assert_eq!(handles.len(), 1);
    match handles.get(Handle::BASE) {
        Some(Referent::String(value)) => assert_eq!(value, &JavaString::from("b")),
        other => panic!("unexpected entry {:?}", other),
    }
    assert_eq!(stream.encode().unwrap(), bytes);

    let stale = [
        HEADER.to_vec(),
        string("a"),
        string("b"),
        vec![TC_RESET],
        reference(0x7E0001),
    ]
    .concat();
    assert!(matches!(
        SerializedStream::decode(&stale),
        Err(Error::UnresolvedHandle {
            handle: Handle(0x7E0001),
            ..
        })
    ));
}

#[test]
fn proxy_instances_carry_their_super_class_data() {
    let proxy_super = class_desc(
        "java.lang.reflect.Proxy",
        -2222568056686623797,
        SERIALIZABLE,
        &[object_field("h", "Ljava/lang/reflect/InvocationHandler;")],
        vec![TC_NULL],
    );
    let bytes = [
        HEADER.to_vec(),
        vec![TC_OBJECT, TC_PROXYCLASSDESC],
        1i32.to_be_bytes().to_vec(),
        utf("com.example.Greeter"),
        vec![TC_ENDBLOCKDATA],
        proxy_super,
        vec![TC_NULL],
    ]
    .concat();

    let stream = SerializedStream::decode(&bytes).unwrap();
    let object = only_object(&stream);
    assert_eq!(object.handle, Handle(0x7E0003));
    match &object.class_pointer {
        ClassPointer::ProxyClassDesc(proxy) => {
            assert_eq!(proxy.handle, Handle::BASE);
            assert_eq!(
                proxy.interfaces,
                vec![JavaString::from("com.example.Greeter")]
            );
        }
        other => panic!("unexpected class {:?}", other),
    }
    assert_eq!(object.class_data.len(), 1);
    assert_eq!(
        object.class_data[0].values,
        vec![FieldValue::Object(Content::Null)]
    );
    assert_eq!(stream.encode().unwrap(), bytes);
}

#[test]
fn enum_constants_and_class_records() {
    let enum_class = class_desc(
        "Color",
        0,
        SERIALIZABLE | 0x10,
        &[],
        class_desc("java.lang.Enum", 0, SERIALIZABLE | 0x10, &[], vec![TC_NULL]),
    );
    let bytes = [
        HEADER.to_vec(),
        vec![TC_ENUM],
        enum_class,
        string("RED"),
        vec![TC_ENUM],
        reference(0x7E0000),
        reference(0x7E0003),
        vec![TC_CLASS],
        reference(0x7E0000),
    ]
    .concat();

    let stream = SerializedStream::decode(&bytes).unwrap();
    assert_eq!(stream.contents.len(), 3);
    match &stream.contents[0] {
        Content::Enum(constant) => {
            assert_eq!(constant.handle, Handle(0x7E0002));
            assert_eq!(constant.inline_name(), Some(&JavaString::from("RED")));
        }
        other => panic!("unexpected record {:?}", other),
    }
    match &stream.contents[1] {
        Content::Enum(constant) => {
            assert_eq!(constant.handle, Handle(0x7E0004));
            assert_eq!(constant.constant_name, Content::Reference(Handle(0x7E0003)));
        }
        other => panic!("unexpected record {:?}", other),
    }
    match &stream.contents[2] {
        Content::Class(class) => assert_eq!(class.handle, Handle(0x7E0005)),
        other => panic!("unexpected record {:?}", other),
    }
    assert_eq!(stream.encode().unwrap(), bytes);
}

#[test]
fn arrays_of_strings() {
    let bytes = [
        HEADER.to_vec(),
        vec![TC_ARRAY],
        class_desc("[Ljava.lang.String;", 0, SERIALIZABLE, &[], vec![TC_NULL]),
        3i32.to_be_bytes().to_vec(),
        string("x"),
        vec![TC_NULL],
        reference(0x7E0002),
    ]
    .concat();

    let stream = SerializedStream::decode(&bytes).unwrap();
    match &stream.contents[..] {
        [Content::Array(array)] => {
            assert_eq!(array.handle, Handle(0x7E0001));
            assert_eq!(array.values.len(), 3);
            assert_eq!(array.values[1], FieldValue::Object(Content::Null));
            assert_eq!(
                array.values[2],
                FieldValue::Object(Content::Reference(Handle(0x7E0002)))
            );
        }
        other => panic!("unexpected contents {:?}", other),
    }
    assert_eq!(stream.encode().unwrap(), bytes);
}

#[test]
fn custom_write_methods_and_externalizable_data() {
    let with_write_object = class_desc(
        "Custom",
        5,
        SERIALIZABLE | 0x01,
        &[primitive_field(b'Z', "flag")],
        vec![TC_NULL],
    );
    let externalizable = class_desc("External", 6, 0x04 | 0x08, &[], vec![TC_NULL]);
    let bytes = [
        HEADER.to_vec(),
        vec![TC_OBJECT],
        with_write_object,
        vec![0x01, TC_BLOCKDATA, 0x02, 0xBE, 0xEF],
        string("extra"),
        vec![TC_ENDBLOCKDATA],
        vec![TC_OBJECT],
        externalizable,
        vec![TC_BLOCKDATALONG, 0x00, 0x00, 0x00, 0x01, 0x2A, TC_ENDBLOCKDATA],
    ]
    .concat();

    let stream = SerializedStream::decode(&bytes).unwrap();
    match &stream.contents[..] {
        [Content::Object(custom), Content::Object(external)] => {
            let data = &custom.class_data[0];
            assert_eq!(data.values, vec![FieldValue::Boolean(1)]);
            let annotation = data.annotation.as_ref().unwrap();
            assert_eq!(annotation.len(), 2);
            assert!(matches!(annotation[0], Content::BlockData(_)));

            let data = &external.class_data[0];
            assert!(data.values.is_empty());
            assert_eq!(data.annotation.as_ref().map(Vec::len), Some(1));
        }
        other => panic!("unexpected contents {:?}", other),
    }
    assert_eq!(stream.encode().unwrap(), bytes);
}

/// `depth` object arrays, each holding the next one (the innermost is empty)
fn nested_arrays(depth: usize) -> Vec<u8> {
    let mut bytes = HEADER.to_vec();
    for level in 0..depth {
        bytes.push(TC_ARRAY);
        if level == 0 {
            bytes.extend(class_desc(
                "[Ljava.lang.Object;",
                0,
                SERIALIZABLE,
                &[],
                vec![TC_NULL],
            ));
        } else {
            bytes.extend(reference(0x7E0000));
        }
        let size: i32 = if level + 1 == depth { 0 } else { 1 };
        bytes.extend(size.to_be_bytes());
    }
    bytes
}

#[test]
fn nesting_is_bounded() {
    let bytes = nested_arrays(20);
    let stream = SerializedStream::decode(&bytes).unwrap();
    assert_eq!(stream.encode().unwrap(), bytes);

    let mut settings = Settings::new();
    settings.max_nesting_depth = 8;
    assert!(matches!(
        SerializedStream::decode_with(&bytes, settings),
        Err(Error::NestingTooDeep { limit: 8, .. })
    ));
}

#[test]
fn edited_graphs_are_checked_on_encode() {
    let bytes = hierarchy_stream();
    let stream = SerializedStream::decode(&bytes).unwrap();

    let mut renumbered = stream.clone();
    if let Content::Object(object) = &mut renumbered.contents[0] {
        object.handle = Handle(0x7E0010);
    }
    assert!(matches!(
        renumbered.encode(),
        Err(EncodeError::HandleMismatch {
            stored: Handle(0x7E0010),
            assigned: Handle(0x7E0003)
        })
    ));

    let mut missing_block = stream.clone();
    if let Content::Object(object) = &mut missing_block.contents[0] {
        object.class_data.pop();
    }
    assert!(matches!(
        missing_block.encode(),
        Err(EncodeError::ClassDataCountMismatch {
            expected: 3,
            found: 2
        })
    ));

    let mut wrong_value = stream;
    if let Content::Object(object) = &mut wrong_value.contents[0] {
        object.class_data[2].values[0] = FieldValue::Int(9);
    }
    assert!(matches!(
        wrong_value.encode(),
        Err(EncodeError::FieldValueMismatch { .. })
    ));
}

#[test]
fn decoded_graphs_move_across_threads() {
    let stream = SerializedStream::decode(&hierarchy_stream()).unwrap();
    let encoded = std::thread::spawn(move || stream.encode().unwrap())
        .join()
        .unwrap();
    assert_eq!(encoded, hierarchy_stream());
}

#[test]
fn dump_names_fields_of_every_class() {
    let stream = SerializedStream::decode(&hierarchy_stream()).unwrap();
    let dumped = dump_to_string(&stream).unwrap();
    assert!(dumped.contains("data Base {\n    a = (int) 7\n  }"));
    assert!(dumped.contains("data Middle {\n  }"));
    assert!(dumped.contains("data Leaf {\n    c = (short) 9\n  }"));
}
