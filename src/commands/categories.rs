use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::json_to_nu;
use crate::ops;
use crate::KanjiTopicsPlugin;

pub struct Categories;

impl PluginCommand for Categories {
    type Plugin = KanjiTopicsPlugin;

    fn name(&self) -> &str {
        "kanji-topics categories"
    }

    fn description(&self) -> &str {
        "List the taxonomy's topic categories in evaluation order"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![(Type::Nothing, Type::table())])
            .named(
                "taxonomy",
                SyntaxShape::String,
                "Path to taxonomy JSON file",
                Some('t'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["kanji", "topic", "taxonomy", "categories", "keywords"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: "kanji-topics categories",
                description: "Show the active taxonomy",
                result: None,
            },
            Example {
                example: "kanji-topics categories | where neutral",
                description: "Find the neutral category",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &KanjiTopicsPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        _input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let taxonomy_path: Option<String> = call.get_flag("taxonomy")?;
        let head = call.head;

        let rows = ops::op_list_categories(taxonomy_path.as_deref())
            .map_err(|e| LabeledError::new(e.to_string()))?;

        Ok(PipelineData::Value(json_to_nu(&rows, head), None))
    }
}
