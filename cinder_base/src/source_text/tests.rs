use super::{SourceMap, SourceText};

#[test]
fn line_table() {
    let source = SourceText::new("test.cn", "first\nsecond\r\nthird");

    assert_eq!(source.line_number(), 3);
    assert_eq!(source.get_line(1), Some("first\n"));
    assert_eq!(source.get_line(2), Some("second\r\n"));
    assert_eq!(source.get_line(3), Some("third"));
    assert_eq!(source.get_line(0), None);
    assert_eq!(source.get_line(4), None);
}

#[test]
fn empty_source_has_one_line() {
    let source = SourceText::new("empty.cn", "");

    assert_eq!(source.line_number(), 1);
    assert_eq!(source.get_line(1), Some(""));
}

#[test]
fn map_preserves_insertion_order() {
    let mut map = SourceMap::new();
    map.insert("b.cn", "bee");
    map.insert("a.cn", "ay");

    let names = map.iter().map(|x| x.name().clone()).collect::<Vec<_>>();
    assert_eq!(names, vec!["b.cn".to_string(), "a.cn".to_string()]);
}

#[test]
fn map_replaces_in_place() {
    let mut map = SourceMap::new();
    map.insert("a.cn", "old");
    map.insert("b.cn", "other");
    map.insert("a.cn", "new");

    assert_eq!(map.len(), 2);
    assert_eq!(map.get("a.cn").unwrap().content(), "new");

    let names = map.iter().map(|x| x.name().clone()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a.cn".to_string(), "b.cn".to_string()]);
}
