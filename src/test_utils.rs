use std::{io::BufRead, path::{Path, PathBuf}};

use anyhow::bail;
use itertools::Itertools;
use serde::{de::{Error, Visitor}, Deserialize, Deserializer};

/// What a line of a testcase should evaluate to: the rendering of a value, or
/// the message of an error value.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutput {
    Output(String),
    Error(String),
}

struct TestOutputVisitor {}

impl<'de> Deserialize<'de> for TestOutput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de> {

        deserializer.deserialize_map(TestOutputVisitor {})
    }
}

impl<'de> Visitor<'de> for TestOutputVisitor {
    type Value = TestOutput;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "A structure containing the boolean key 'ok'. If it's okay, contains the key 'output', otherwise the key 'message'")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>, {

        if map.next_key::<String>()?.as_deref() != Some("ok") {
            return Err(A::Error::custom("First key should be 'ok'"))
        }

        let ok: bool = map.next_value()?;
        let expected_key = if ok { "output" } else { "message" };
        if map.next_key::<String>()?.as_deref() != Some(expected_key) {
            return Err(A::Error::custom(format!("Second key should be '{}'", expected_key)))
        }

        let text: String = map.next_value()?;
        if map.next_key::<String>()?.is_some() {
            return Err(A::Error::custom("Only two keys should be present"));
        }

        Ok(if ok { TestOutput::Output(text) } else { TestOutput::Error(text) })
    }
}

fn base_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn load_input_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let source = std::fs::read(path)?;
    Ok(source.lines().collect::<Result<Vec<String>, _>>()?)
}

fn load_output_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TestOutput>> {
    let source = std::fs::read(path)?;
    let result: Vec<TestOutput> = serde_json::from_slice(&source)?;
    Ok(result)
}

pub fn load_test_pair(testcase: usize) -> anyhow::Result<Vec<(String, TestOutput)>> {
    let input = load_input_file(base_path().join("test_inputs").join(format!("{}.rok", testcase)))?;
    let output = load_output_file(base_path().join("test_outputs").join(format!("{}.json", testcase)))?;

    if input.len() != output.len() { bail!("Input and output of testcase {} does not match", testcase); }
    Ok(input.into_iter().zip(output).collect_vec())
}

/// Every testcase that has an input file, in order.
pub fn all_testcases() -> anyhow::Result<Vec<usize>> {
    let mut testcases = vec![];
    for entry in std::fs::read_dir(base_path().join("test_inputs"))? {
        let path = entry?.path();
        if path.extension().is_some_and(|extension| extension == "rok") {
            if let Some(testcase) = path.file_stem().and_then(|stem| stem.to_str()).and_then(|stem| stem.parse().ok()) {
                testcases.push(testcase);
            }
        }
    }

    if testcases.is_empty() { bail!("No testcases found"); }
    Ok(testcases.into_iter().sorted().collect_vec())
}
