//! Built-in language parsers

mod cpp;
mod csharp;
mod go;
mod html;
mod java;
mod javascript;
mod php;
mod python;
mod typescript;

pub use cpp::CppParser;
pub use csharp::CSharpParser;
pub use go::GoParser;
pub use html::HtmlParser;
pub use java::JavaParser;
pub use javascript::JavaScriptParser;
pub use php::PhpParser;
pub use python::PythonParser;
pub use typescript::TypeScriptParser;

use crate::parser::LanguageParser;
use std::sync::Arc;

/// One instance of every built-in parser
pub fn builtin_parsers() -> Vec<Arc<dyn LanguageParser>> {
    vec![
        Arc::new(CppParser::new()),
        Arc::new(JavaParser::new()),
        Arc::new(CSharpParser::new()),
        Arc::new(GoParser::new()),
        Arc::new(PhpParser::new()),
        Arc::new(TypeScriptParser::new()),
        Arc::new(JavaScriptParser::new()),
        Arc::new(PythonParser::new()),
        Arc::new(HtmlParser::new()),
    ]
}
