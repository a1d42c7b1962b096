use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use super::util::{input_to_json, json_to_nu};
use crate::ops;
use crate::KanjiTopicsPlugin;

pub struct Explain;

impl PluginCommand for Explain {
    type Plugin = KanjiTopicsPlugin;

    fn name(&self) -> &str {
        "kanji-topics explain"
    }

    fn description(&self) -> &str {
        "Show which category each kanji routes to, the tier that decided it and the matching keyword"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::record(), Type::table()),
            ])
            .named(
                "taxonomy",
                SyntaxShape::String,
                "Path to taxonomy JSON file",
                Some('t'),
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
        vec!["kanji", "topic", "explain", "route", "why"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"open data/n3/kanji/kanji.json | kanji-topics explain | where tier == neutral"#,
            description: "List the kanji no keyword matched",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &KanjiTopicsPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let taxonomy_path: Option<String> = call.get_flag("taxonomy")?;
        let neutral: Option<String> = call.get_flag("neutral")?;
        let head = call.head;

        let source = input_to_json(input);
        let rows = ops::op_explain(&source, taxonomy_path.as_deref(), neutral.as_deref())
            .map_err(|e| LabeledError::new(e.to_string()))?;

        let results: Vec<Value> = match rows {
            serde_json::Value::Array(rows) => rows.iter().map(|r| json_to_nu(r, head)).collect(),
            other => vec![json_to_nu(&other, head)],
        };

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
