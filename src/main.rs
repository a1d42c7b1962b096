use kanji_topics::KanjiTopicsPlugin;
use nu_plugin::{serve_plugin, MsgPackSerializer};

fn main() {
    serve_plugin(&KanjiTopicsPlugin, MsgPackSerializer {})
}
