use lersp::{Config, ErrorKind, Reader, Runtime, Value, parse};

fn read_all(rt: &mut Runtime, input: &str) -> Vec<String> {
    let mut reader = rt.reader(input);
    let mut forms = Vec::new();
    while let Some(value) = reader.read_one(rt).unwrap() {
        forms.push(rt.display(value).to_string());
    }
    forms
}

#[test]
fn test_multiple_forms_from_one_stream() {
    let mut rt = Runtime::new(Config::default()).unwrap();
    let forms = read_all(
        &mut rt,
        "; a program\n(label x 1)\n(+ x 2) ; trailing\nfoo 3.25\n",
    );
    assert_eq!(forms, vec!["(LABEL X 1)", "(+ X 2)", "FOO", "3.25"]);
}

#[test]
fn test_number_symbol_boundaries() {
    let mut rt = Runtime::new(Config::default()).unwrap();
    assert_eq!(read_all(&mut rt, "(1(2)3)"), vec!["(1 (2) 3)"]);
    assert_eq!(read_all(&mut rt, "-4 - -x"), vec!["-4", "-", "-X"]);
    assert_eq!(read_all(&mut rt, "1.5e2"), vec!["150"]);
}

#[test]
fn test_long_symbols_truncated() {
    let mut rt = Runtime::new(Config::default().with_max_token_length(8)).unwrap();
    assert_eq!(
        read_all(&mut rt, "(averyveryverylongname next)"),
        vec!["(AVERYVER NEXT)"]
    );
    // Names equal up to the bound are the same symbol
    let a = rt.symbols().lookup("AVERYVER");
    assert!(a.is_some());
    assert_eq!(read_all(&mut rt, "averyverydifferent"), vec!["AVERYVER"]);
}

#[test]
fn test_nil_reads_as_empty_list() {
    let mut rt = Runtime::new(Config::default()).unwrap();
    let value = parse(&mut rt, "nil").unwrap();
    assert_eq!(value, Value::Nil);
    let value = parse(&mut rt, "()").unwrap();
    assert_eq!(value, Value::Nil);
}

#[test]
fn test_reading_does_not_evaluate() {
    let mut rt = Runtime::new(Config::default()).unwrap();
    let value = parse(&mut rt, "(car undefined)").unwrap();
    assert_eq!(rt.list_length(value).unwrap(), 2);
}

#[test]
fn test_unexpected_end_vs_clean_end() {
    let mut rt = Runtime::new(Config::default()).unwrap();
    let mut reader = Reader::new("(a (b c)".chars());
    let err = reader.read_one(&mut rt).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedEnd);

    let mut reader = Reader::new("  ; only a comment".chars());
    assert_eq!(reader.read_one(&mut rt).unwrap(), None);
}

#[test]
fn test_syntax_errors() {
    let mut rt = Runtime::new(Config::default()).unwrap();
    for input in [")", "(a . b c)", "(. b)"] {
        let err = parse(&mut rt, input).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax, "input: {input}");
    }
    assert_eq!(rt.pinned(), 0);
}

#[test]
fn test_reading_under_memory_pressure() {
    let mut rt = Runtime::new(Config::default().with_heap_cells(400)).unwrap();
    let source = format!("({})", (0..100).map(|i| i.to_string()).collect::<Vec<_>>().join(" "));
    for _ in 0..10 {
        let value = parse(&mut rt, &source).unwrap();
        assert_eq!(rt.list_length(value).unwrap(), 100);
    }
}

#[test]
fn test_symbol_space_exhaustion_while_reading() {
    let config = Config::default().with_max_symbols(30);
    let mut rt = Runtime::new(config).unwrap();
    let source = (0..20).map(|i| format!("sym{i}")).collect::<Vec<_>>().join(" ");
    let err = rt.eval_str(&format!("(quote ({source}))")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::SymbolSpaceExhausted);
    assert!(err.is_fatal());
}
