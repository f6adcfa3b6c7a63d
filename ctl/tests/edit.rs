use std::fmt;

use ctl::block::lines::split_lines;
use ctl::edit::{apply_edit, edit_blocks};
use ctl::model::{ModelLibrary, blocks_from_model, blocks_to_model};
use ctl::parser::Parser;
use ctl::{BlockStore, StoreError};

const MODEL: &str = "$PROBLEM base\n$DATA base.csv\n$PK\nCL = THETA(1)\nV = THETA(2)\n";

fn parse(source: &str) -> BlockStore {
    Parser::new(source.to_string(), 0).parse()
}

#[test]
fn split_lines_keeps_terminators() {
    assert_eq!(split_lines("a\nb\r\nc\rd"), ["a\n", "b\r\n", "c\r", "d"]);
    assert_eq!(split_lines("x\u{2028}y\n"), ["x\u{2028}", "y\n"]);
    assert!(split_lines("").is_empty());
    assert_eq!(split_lines("\n\n"), ["\n", "\n"]);
}

#[test]
fn apply_edit_splits_editor_text() {
    let mut store = parse(MODEL);
    apply_edit(&mut store, "$PK", "$PK\nCL = THETA(1) * EXP(ETA(1))\n").unwrap();

    let pk = store.get("$PK").unwrap();
    assert_eq!(
        pk.occurrences,
        vec![vec!["$PK\n".to_string(), "CL = THETA(1) * EXP(ETA(1))\n".to_string()]]
    );
}

#[test]
fn edit_blocks_works_on_a_copy() {
    let store = parse(MODEL);
    let edited = edit_blocks(&store, [("$DATA", "$DATA new.csv\n"), ("$PROBLEM", "$PROBLEM v2\n")]).unwrap();

    assert_eq!(store.get("$DATA").unwrap().text(), "$DATA base.csv\n");
    assert!(store.change_log().is_empty());
    assert_eq!(edited.change_log().len(), 2);
    assert_eq!(edited.change_log().entries()[0].block_name, "$DATA");
    assert!(edited.render().starts_with("$PROBLEM v2\n\n$DATA new.csv"));
}

#[test]
fn edit_blocks_checks_names_first() {
    let store = parse(MODEL);
    let err = edit_blocks(&store, [("$DATA", "$DATA x\n"), ("$ERROR", "$ERROR\n")]).unwrap_err();
    assert_eq!(err, StoreError::BlockNotFound("$ERROR".to_string()));
}

#[derive(Debug, Clone, PartialEq)]
struct FakeModel {
    code: String,
    dataset: Option<String>,
}

#[derive(Debug)]
struct FakeError;

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model code has no $PROBLEM")
    }
}

impl std::error::Error for FakeError {}

struct FakeLibrary;

impl ModelLibrary for FakeLibrary {
    type Handle = FakeModel;
    type Dataset = Option<String>;
    type DataInfo = ();
    type Error = FakeError;

    fn code(&self, model: &FakeModel) -> String {
        model.code.clone()
    }

    fn parse_model(&self, code: &str) -> Result<FakeModel, FakeError> {
        if !code.contains("$PROBLEM") {
            return Err(FakeError);
        }
        Ok(FakeModel {
            code: code.to_string(),
            dataset: None,
        })
    }

    fn dataset(&self, model: &FakeModel) -> Option<String> {
        model.dataset.clone()
    }

    fn datainfo(&self, _model: &FakeModel) {}

    fn with_dataset(&self, model: FakeModel, dataset: Option<String>, _: ()) -> Result<FakeModel, FakeError> {
        Ok(FakeModel { dataset, ..model })
    }
}

#[test]
fn model_round_trip_keeps_parent_dataset() {
    let parent = FakeModel {
        code: MODEL.to_string(),
        dataset: Some("rows: 120".to_string()),
    };

    let mut blocks = blocks_from_model(&FakeLibrary, &parent, '$');
    assert_eq!(blocks.names().collect::<Vec<_>>(), ["$PROBLEM", "$DATA", "$PK"]);

    apply_edit(&mut blocks, "$PROBLEM", "$PROBLEM edited\n").unwrap();
    let child = blocks_to_model(&FakeLibrary, &blocks, &parent).unwrap();

    assert_eq!(child.dataset, parent.dataset);
    assert!(child.code.starts_with("$PROBLEM edited\n\n$DATA base.csv"));
}

#[test]
fn model_parse_errors_propagate() {
    let parent = FakeModel {
        code: MODEL.to_string(),
        dataset: None,
    };
    let empty = BlockStore::new();
    assert!(blocks_to_model(&FakeLibrary, &empty, &parent).is_err());
}
