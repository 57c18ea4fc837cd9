//! Documents inside the supported subset must parse the same way a full
//! YAML implementation reads them.

use shma_yaml::{Mapping, Value, parse_all, parse_one};
use yaml_rust2::{Yaml, YamlLoader};

fn from_reference(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Integer(n) => Value::Int(*n),
        Yaml::Real(s) => Value::Float(s.parse().expect("reference real")),
        Yaml::String(s) => Value::from(s.as_str()),
        Yaml::Array(items) => Value::Sequence(items.iter().map(from_reference).collect()),
        Yaml::Hash(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (from_reference(k), from_reference(v)))
                .collect::<Mapping>(),
        ),
        other => panic!("unexpected reference node {:?}", other),
    }
}

fn reference_documents(text: &str) -> Vec<Value> {
    YamlLoader::load_from_str(text)
        .expect("reference parser accepts input")
        .iter()
        .map(from_reference)
        .collect()
}

fn assert_same(text: &str) {
    let expected = reference_documents(text);
    assert_eq!(expected.len(), 1, "single document expected");
    assert_eq!(parse_one(text).unwrap(), expected[0], "input:\n{text}");
}

#[test]
fn test_service_description() {
    assert_same(
        r#"
name: web
replicas: 3
ratio: 0.75
enabled: true
debug: false
owner: ~
description: null
tags: [frontend, "public facing", 'v2']
labels: {tier: web, team: platform}
ports:
  - 80
  - 443
env:
  - name: MODE
    value: production
  - name: LEVEL
    value: "3"
nested:
  deeper:
    deepest: value # trailing comment
  sibling: 'quoted # not a comment'
url: http://example.com:8080/path
empty_list: []
empty_map: {}
"#,
    );
}

#[test]
fn test_block_scalars() {
    assert_same(
        r#"
command: |
  serve --port 80
    --verbose
summary: >
  first line
  continues

  new paragraph
trailing: |-
  no newline
folded_strip: >-
  one
  two
after: done
"#,
    );
}

#[test]
fn test_sequence_of_mappings_and_lists() {
    assert_same(
        r#"
- name: a
  ports: [1, 2]
- name: b
  labels:
    env: prod
-
  - inner one
  - inner two
- plain
"#,
    );
}

#[test]
fn test_quoting_and_escapes() {
    assert_same(
        r#"
single: 'it''s here'
double: "line\nbreak and \"quotes\""
unicode: "café"
colon_in_value: "a: b"
"quoted key": 1
spaced plain: several words here
"#,
    );
}

#[test]
fn test_document_stream() {
    let text = "---\nname: a\n---\nname: b\nlist:\n  - x\n";
    let ours: Vec<_> = parse_all(text).collect::<Result<_, _>>().unwrap();
    assert_eq!(ours, reference_documents(text));
}
