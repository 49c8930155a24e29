//! Chunking behaviour of the stream parser across every way of splitting
//! a turn.

use react_yaml::ActionDocument;
use react_yaml::format::{self, YamlFormat, example_documents};
use react_yaml::observer::NoopObserver;
use react_yaml::parser::{ParseOutcome, StreamParser};
use react_yaml::turn::{collect_content, collect_reasoning, run_chunks};
use serde_json::json;

const TURNS: &[&str] = &[
    "thinking: |\n  hello\n\ntype: final\nfinal: done\n",
    "thinking: quick note\ntype: final\nfinal: ok\n",
    "thinking: |\n  first\n\n  second\n    nested\ntype: tool\ntool_name: search\ntool_args:\n  query: \"a: b\"\n",
    "thinking: |-\r\n  crlf line\r\ntype: error\r\nerror: broken\r\n",
    "  thinking: |\n    indented\n  type: final\n  final: yes\n",
    "thinking: |\n  ünïcödé ✓\ntype: final\nfinal: 完成\n",
    "thinking: |\n  partial",
    "thinking: |\n  hi\ntype: final\nfinal: ok\n\nLet me know if you need more.\n",
    "type: final\nfinal: no reasoning\n",
];

struct Run {
    parser: StreamParser,
    outcomes: Vec<ParseOutcome>,
}

fn feed(chunks: &[&str]) -> Run {
    let mut parser = StreamParser::new();
    let mut outcomes = Vec::new();
    for chunk in chunks {
        outcomes.push(parser.feed(chunk).unwrap());
    }
    outcomes.push(parser.finalize().unwrap());
    Run { parser, outcomes }
}

fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).skip(1).collect()
}

fn one_char_chunks(text: &str) -> Vec<String> {
    text.chars().map(String::from).collect()
}

fn document(value: serde_json::Value) -> ActionDocument {
    value.as_object().unwrap().clone()
}

#[test]
fn every_two_way_split_matches_single_chunk() {
    for &turn in TURNS {
        let whole = feed(&[turn]);
        for at in char_boundaries(turn) {
            let (head, tail) = turn.split_at(at);
            let split = feed(&[head, tail]);
            assert_eq!(
                split.parser.reasoning_text(),
                whole.parser.reasoning_text(),
                "{turn:?} split at {at}"
            );
            assert_eq!(
                split.parser.parsed_document(),
                whole.parser.parsed_document(),
                "{turn:?} split at {at}"
            );
            assert_eq!(split.parser.raw_text(), turn);
        }
    }
}

#[test]
fn one_char_chunks_match_single_chunk() {
    for &turn in TURNS {
        let whole = feed(&[turn]);
        let chars = one_char_chunks(turn);
        let chunks: Vec<&str> = chars.iter().map(String::as_str).collect();
        let split = feed(&chunks);
        assert_eq!(split.parser.reasoning_text(), whole.parser.reasoning_text(), "{turn:?}");
        assert_eq!(split.parser.parsed_document(), whole.parser.parsed_document(), "{turn:?}");
        assert_eq!(split.parser.is_complete(), whole.parser.is_complete(), "{turn:?}");
    }
}

#[test]
fn deltas_reassemble_reasoning_and_action_text() {
    for &turn in TURNS {
        let chars = one_char_chunks(turn);
        let chunks: Vec<&str> = chars.iter().map(String::as_str).collect();
        for run in [feed(&[turn]), feed(&chunks)] {
            assert_eq!(collect_reasoning(&run.outcomes), run.parser.reasoning_text(), "{turn:?}");
            assert_eq!(collect_content(&run.outcomes), run.parser.action_text(), "{turn:?}");
        }
    }
}

#[test]
fn reference_turns() {
    let run = feed(&[TURNS[0]]);
    assert_eq!(run.parser.reasoning_text(), "hello\n");
    assert_eq!(
        run.parser.parsed_document(),
        Some(&document(json!({"type": "final", "final": "done"})))
    );

    let run = feed(&[TURNS[1]]);
    assert_eq!(run.parser.reasoning_text(), "quick note");
    assert!(run.outcomes[0].reasoning_complete);
    assert!(run.parser.is_complete());

    let run = feed(&[TURNS[2]]);
    assert_eq!(run.parser.reasoning_text(), "first\n\nsecond\n  nested\n");
    assert_eq!(
        run.parser.parsed_document().unwrap()["tool_args"],
        json!({"query": "a: b"})
    );

    let run = feed(&[TURNS[6]]);
    assert_eq!(run.parser.reasoning_text(), "partial");
    assert!(run.outcomes.last().unwrap().reasoning_complete);
    assert_eq!(run.parser.parsed_document(), None);
}

#[test]
fn column_zero_type_line_ends_block_before_it_parses() {
    let mut parser = StreamParser::new();
    parser.feed("thinking: |\n  working\n").unwrap();
    let outcome = parser.feed("type:").unwrap();
    assert!(outcome.reasoning_complete);
    assert_eq!(parser.reasoning_text(), "working\n");
}

#[test]
fn examples_in_instructions_stream_cleanly() {
    let format = YamlFormat::default();
    for example in example_documents(format.config()) {
        let Some(kind) = example.kind else { continue };
        let chars = one_char_chunks(&example.body);
        let output = run_chunks(&chars, &format, &NoopObserver).unwrap();
        assert!(!output.recovered, "{}", example.label);
        assert_eq!(output.action.kind().as_str(), kind);
        assert!(!output.reasoning.is_empty());
    }
}

#[test]
fn extract_block_idempotent_over_turns() {
    let mut inputs: Vec<String> = TURNS.iter().map(|t| t.to_string()).collect();
    inputs.extend(TURNS.iter().map(|t| format!("Here:\n```yaml\n{t}```\n")));
    inputs.push(format::render_instructions());
    for input in &inputs {
        let once = format::extract_block(input);
        assert_eq!(format::extract_block(once), once);
    }
}

#[test]
fn fenced_turn_recovers_through_the_driver() {
    let turn = format!("Sure.\n```yaml\n{}```", TURNS[0]);
    let output = run_chunks([turn.as_str()], &YamlFormat::default(), &NoopObserver).unwrap();
    assert!(output.recovered);
    assert_eq!(output.reasoning, "hello\n");
    assert_eq!(
        output.document,
        Some(document(json!({"thinking": "hello\n", "type": "final", "final": "done"})))
    );
}

#[test]
fn trailing_prose_decodes_the_same_for_any_chunking() {
    let turn = TURNS[7];
    let format = YamlFormat::default();
    let whole = run_chunks([turn], &format, &NoopObserver).unwrap();
    let split = run_chunks(one_char_chunks(turn), &format, &NoopObserver).unwrap();

    assert_eq!(split.document, whole.document);
    assert_eq!(split.action, whole.action);
    assert!(split.action.is_error());
}
