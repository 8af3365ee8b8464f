use std::error::Error;

use propwire::exception::{CallFrame, Fault, FaultGraph, FaultId, RemoteException};
use propwire::{CodecConfig, CodecError, Decoder, Encoder, MemoryBag, PropertyBag};

fn frames(class: &str, methods: &[(&str, i32)]) -> Vec<CallFrame> {
    methods
        .iter()
        .map(|(method, line)| {
            let file = format!("{}.java", class.rsplit('.').next().unwrap_or(class));
            CallFrame::new(class, *method, Some(&file), *line)
        })
        .collect()
}

/// `ServiceException` caused by `SQLException` caused by `SocketTimeoutException`.
fn nested_chain() -> (FaultGraph, FaultId) {
    let mut graph = FaultGraph::new();
    let root = graph.push(
        Fault::new("java.net.SocketTimeoutException", Some("Read timed out")).with_frames(vec![
            CallFrame::new("java.net.SocketInputStream", "socketRead0", None, -2),
            CallFrame::new("java.net.SocketInputStream", "read", Some("SocketInputStream.java"), 150),
        ]),
    );
    let mid = graph.push_caused_by(
        Fault::new("java.sql.SQLException", Some("connection reset"))
            .with_frames(frames("com.acme.db.Pool", &[("borrow", 88), ("query", 41)])),
        root,
    );
    let top = graph.push_caused_by(
        Fault::new("com.acme.ServiceException", None)
            .with_frames(frames("com.acme.OrderService", &[("place", 120), ("handle", 33)])),
        mid,
    );
    (graph, top)
}

#[test]
fn nested_chain_roundtrip_preserves_every_level() {
    let (graph, top) = nested_chain();
    let mut bag = MemoryBag::new();
    let written = Encoder::new(&mut bag)
        .encode_exception_chain(&graph, top)
        .unwrap();
    assert_eq!(written, 3);

    let dec = Decoder::new(&bag);
    assert!(dec.has_encoded_exception().unwrap());
    let decoded = dec.decode_exception_chain_with_local_frames(Vec::new()).unwrap();

    let original: Vec<&Fault> = graph.chain(top, 64).map(|(_, f)| f).collect();
    let rebuilt: Vec<&RemoteException> = decoded.chain().collect();
    assert_eq!(rebuilt.len(), original.len());
    for (remote, fault) in rebuilt.iter().zip(&original) {
        assert_eq!(remote.class_name(), fault.class_name);
        assert_eq!(remote.message(), fault.message.as_deref());
        assert_eq!(remote.frames(), fault.frames.as_slice());
    }
    assert_eq!(
        decoded.root_cause().class_name(),
        "java.net.SocketTimeoutException"
    );
    assert_eq!(
        decoded.source().map(|s| s.to_string()).as_deref(),
        Some("remote java.sql.SQLException: connection reset")
    );
}

#[test]
fn wire_layout_matches_key_convention() {
    let (graph, top) = nested_chain();
    let mut bag = MemoryBag::new();
    Encoder::new(&mut bag)
        .encode_exception_chain(&graph, top)
        .unwrap();

    assert!(bag.get_bool("BVException").unwrap());
    assert_eq!(bag.get_int("Exception_Count").unwrap(), 3);
    assert_eq!(
        bag.get_string("Exception_0.ClassName").unwrap(),
        "com.acme.ServiceException"
    );
    assert!(!bag.contains("Exception_0.Message"));
    assert_eq!(
        bag.get_string("Exception_2.Message").unwrap(),
        "Read timed out"
    );
    assert_eq!(bag.get_int("Exception_1.StackFrame_Count").unwrap(), 2);
    assert_eq!(
        bag.get_string("Exception_1.StackFrame_0.DeclaringClass").unwrap(),
        "com.acme.db.Pool"
    );
    assert_eq!(
        bag.get_string("Exception_1.StackFrame_1.MethodName").unwrap(),
        "query"
    );
    assert_eq!(
        bag.get_string("Exception_1.StackFrame_1.FileName").unwrap(),
        "Pool.java"
    );
    assert_eq!(
        bag.get_int("Exception_1.StackFrame_1.LineNumber").unwrap(),
        41
    );
    assert!(!bag.contains("Exception_2.StackFrame_0.FileName"));
    assert_eq!(
        bag.get_int("Exception_2.StackFrame_0.LineNumber").unwrap(),
        -2
    );
}

#[test]
fn self_referential_cause_encodes_one_entry() {
    let mut graph = FaultGraph::new();
    let x = graph.push(
        Fault::new("java.lang.IllegalStateException", Some("loop"))
            .with_frames(frames("a.B", &[("c", 1)])),
    );
    graph.set_cause(x, Some(x));

    let mut bag = MemoryBag::new();
    let written = Encoder::new(&mut bag).encode_exception_chain(&graph, x).unwrap();
    assert_eq!(written, 1);
    assert_eq!(bag.get_int("Exception_Count").unwrap(), 1);

    let decoded = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap();
    assert_eq!(decoded.chain().count(), 1);
    assert!(decoded.cause().is_none());
}

#[test]
fn longer_cycle_stops_at_first_revisit() {
    let mut graph = FaultGraph::new();
    let a = graph.push(Fault::new("A", None));
    let b = graph.push_caused_by(Fault::new("B", None), a);
    let c = graph.push_caused_by(Fault::new("C", None), b);
    graph.set_cause(a, Some(c));

    let mut bag = MemoryBag::new();
    let written = Encoder::new(&mut bag).encode_exception_chain(&graph, c).unwrap();
    assert_eq!(written, 3);
    let decoded = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap();
    let names: Vec<_> = decoded.chain().map(|e| e.class_name().to_owned()).collect();
    assert_eq!(names, ["C", "B", "A"]);
}

#[test]
fn depth_bound_from_config_truncates_chain() {
    let (graph, top) = nested_chain();
    let config = CodecConfig {
        max_exception_depth: 2,
        ..CodecConfig::default()
    };
    let mut bag = MemoryBag::new();
    let written = Encoder::with_config(&mut bag, &config)
        .encode_exception_chain(&graph, top)
        .unwrap();
    assert_eq!(written, 2);
    assert!(!bag.contains("Exception_2.ClassName"));
}

#[test]
fn local_call_site_is_appended_to_outermost_only() {
    let (graph, top) = nested_chain();
    let mut bag = MemoryBag::new();
    Encoder::new(&mut bag)
        .encode_exception_chain(&graph, top)
        .unwrap();

    let decoded = Decoder::new(&bag).decode_exception_chain().unwrap();
    let line = line!() - 1;

    let outer = decoded.frames();
    assert_eq!(outer.len(), 3);
    let local = &outer[2];
    assert_eq!(local.method_name, "decode_exception_chain");
    assert_eq!(local.line_number, line as i32);
    assert!(local
        .file_name
        .as_deref()
        .is_some_and(|f| f.ends_with("exception_chain_matrix.rs")));

    let cause = decoded.cause().unwrap();
    assert_eq!(cause.frames().len(), 2);
    assert_eq!(cause.root_cause().frames().len(), 2);
}

#[test]
fn explicit_local_frames_are_appended_in_order() {
    let (graph, top) = nested_chain();
    let mut bag = MemoryBag::new();
    Encoder::new(&mut bag)
        .encode_exception_chain(&graph, top)
        .unwrap();

    let local = frames("client.Caller", &[("invoke", 10), ("main", 2)]);
    let decoded = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(local.clone())
        .unwrap();
    assert_eq!(&decoded.frames()[2..], local.as_slice());
}

#[test]
fn decode_without_flag_is_invalid_state() {
    let bag = MemoryBag::new();
    let dec = Decoder::new(&bag);
    assert!(!dec.has_encoded_exception().unwrap());
    assert!(matches!(
        dec.decode_exception_chain(),
        Err(CodecError::InvalidState(_))
    ));
}

#[test]
fn flagged_bag_without_count_is_missing_field() {
    let mut bag = MemoryBag::new();
    bag.set_bool("BVException", true).unwrap();
    let err = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap_err();
    assert_eq!(err, CodecError::MissingField("Exception_Count".into()));
}

#[test]
fn native_error_chain_roundtrip() {
    #[derive(Debug)]
    struct ConfigLoad {
        source: std::io::Error,
    }
    impl std::fmt::Display for ConfigLoad {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("could not load settings")
        }
    }
    impl Error for ConfigLoad {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.source)
        }
    }

    let err = ConfigLoad {
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "settings.toml"),
    };
    let mut bag = MemoryBag::new();
    assert_eq!(Encoder::new(&mut bag).encode_error(&err).unwrap(), 2);

    let decoded = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap();
    assert_eq!(decoded.class_name(), "ConfigLoad");
    assert_eq!(decoded.message(), Some("could not load settings"));
    assert_eq!(decoded.root_cause().message(), Some("settings.toml"));
    assert!(decoded.frames().is_empty());
}

#[test]
fn rendered_trace_lists_causes() {
    let (graph, top) = nested_chain();
    let mut bag = MemoryBag::new();
    Encoder::new(&mut bag)
        .encode_exception_chain(&graph, top)
        .unwrap();
    let decoded = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap();

    let trace = decoded.render_trace();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines[0], "remote com.acme.ServiceException");
    assert_eq!(lines[1], "\tat com.acme.OrderService.place(OrderService.java:120)");
    assert!(lines.contains(&"Caused by: remote java.sql.SQLException: connection reset"));
    assert!(lines.contains(&"\tat java.net.SocketInputStream.socketRead0(Native Method)"));
}

#[test]
fn self_sourcing_native_error_encodes_once() {
    #[derive(Debug)]
    struct Reentrant;
    impl std::fmt::Display for Reentrant {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("handler re-entered")
        }
    }
    impl Error for Reentrant {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(self)
        }
    }

    let mut bag = MemoryBag::new();
    assert_eq!(Encoder::new(&mut bag).encode_error(&Reentrant).unwrap(), 1);
    let decoded = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap();
    assert_eq!(decoded.class_name(), "Reentrant");
    assert!(decoded.cause().is_none());
}

#[test]
fn long_native_source_chain_is_capped_by_config() {
    #[derive(Debug)]
    struct Layer(Option<Box<Layer>>);
    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("layer")
        }
    }
    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.0.as_deref().map(|l| l as &(dyn Error + 'static))
        }
    }

    let mut err = Layer(None);
    for _ in 0..20 {
        err = Layer(Some(Box::new(err)));
    }
    let config = CodecConfig {
        max_exception_depth: 5,
        ..CodecConfig::default()
    };
    let mut bag = MemoryBag::new();
    let written = Encoder::with_config(&mut bag, &config)
        .encode_error(&err)
        .unwrap();
    assert_eq!(written, 5);
    assert_eq!(bag.get_int("Exception_Count").unwrap(), 5);
}

#[test]
fn huge_frame_count_reports_first_missing_frame() {
    let mut bag = MemoryBag::new();
    bag.set_bool("BVException", true).unwrap();
    bag.set_int("Exception_Count", 1).unwrap();
    bag.set_string("Exception_0.ClassName", "X").unwrap();
    bag.set_int("Exception_0.StackFrame_Count", i32::MAX).unwrap();

    let err = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap_err();
    assert_eq!(
        err,
        CodecError::MissingField("Exception_0.StackFrame_0.DeclaringClass".into())
    );
}

#[test]
fn exception_count_beyond_depth_bound_is_rejected() {
    let mut bag = MemoryBag::new();
    bag.set_bool("BVException", true).unwrap();
    bag.set_int("Exception_Count", i32::MAX).unwrap();

    let err = Decoder::new(&bag)
        .decode_exception_chain_with_local_frames(Vec::new())
        .unwrap_err();
    assert!(
        matches!(err, CodecError::TypeMismatch { ref key, .. } if key == "Exception_Count"),
        "{err:?}"
    );

    let config = CodecConfig {
        max_exception_depth: 2,
        ..CodecConfig::default()
    };
    let (graph, top) = nested_chain();
    let mut bag = MemoryBag::new();
    Encoder::new(&mut bag)
        .encode_exception_chain(&graph, top)
        .unwrap();
    assert!(Decoder::with_config(&bag, &config)
        .decode_exception_chain_with_local_frames(Vec::new())
        .is_err());
}

#[test]
fn huge_map_count_reports_first_missing_pair() {
    let mut bag = MemoryBag::new();
    bag.set_int("mCount", i32::MAX).unwrap();
    let err = Decoder::new(&bag).decode_map_as::<i32, i32>("m", "Key").unwrap_err();
    assert_eq!(err, CodecError::MissingField("m0.Key".into()));
}
