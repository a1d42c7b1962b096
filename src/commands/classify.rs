use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{input_to_json, json_to_nu};
use crate::algo::partition::DEFAULT_MAX_CATEGORY_SIZE;
use crate::ops;
use crate::KanjiTopicsPlugin;

pub struct Classify;

impl PluginCommand for Classify {
    type Plugin = KanjiTopicsPlugin;

    fn name(&self) -> &str {
        "kanji-topics classify"
    }

    fn description(&self) -> &str {
        "Assign every kanji to exactly one topic category and split topics into groups of bounded size"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::record()),
                (Type::record(), Type::record()),
            ])
            .named(
                "taxonomy",
                SyntaxShape::String,
                "Path to taxonomy JSON file (default: $KANJI_TOPICS_TAXONOMY, XDG data dir, then built-in)",
                Some('t'),
            )
            .named(
                "max-size",
                SyntaxShape::Int,
                "Maximum kanji per category (default: 10)",
                Some('m'),
            )
            .named(
                "neutral",
                SyntaxShape::String,
                "Override the taxonomy's neutral category key",
                Some('n'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["kanji", "topic", "classify", "categorize", "group", "partition"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"open data/n3/kanji/kanji.json | kanji-topics classify"#,
                description: "Build the topic mapping for an N3 kanji file",
                result: None,
            },
            Example {
                example: r#"[[id character meanings]; [1 法 {en: law}] [2 猫 {en: cat}]] | kanji-topics classify --max-size 5"#,
                description: "Classify a table of kanji records with groups of at most 5",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &KanjiTopicsPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let taxonomy_path: Option<String> = call.get_flag("taxonomy")?;
        let max_size = call
            .get_flag::<i64>("max-size")?
            .map(|n| n.max(1) as usize)
            .unwrap_or(DEFAULT_MAX_CATEGORY_SIZE);
        let neutral: Option<String> = call.get_flag("neutral")?;
        let head = call.head;

        let source = input_to_json(input);
        let doc = ops::op_classify(
            &source,
            taxonomy_path.as_deref(),
            max_size,
            neutral.as_deref(),
        )
        .map_err(|e| LabeledError::new(e.to_string()))?;

        Ok(PipelineData::Value(json_to_nu(&doc, head), None))
    }
}
