//! Parsing and printing around the rewrite passes.
//!
//! Input is always parsed as a module; `require` stays an ordinary call
//! expression under module parsing, so CommonJS sources need no separate
//! script mode.

use serde::{Deserialize, Serialize};
use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::{sync::Lrc, FileName, SourceMap};
use swc_core::ecma::ast::{EsVersion, Module, Str};
use swc_core::ecma::codegen::{text_writer::JsWriter, Config, Emitter, Node};
use swc_core::ecma::parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::error::Error;

/// Source dialect to parse. TypeScript is the default and also handles plain
/// JavaScript; the EcmaScript dialect exists for sources that use JSX without
/// a `.tsx` extension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Typescript,
    Ecmascript,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    fn quote_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    /// Preferred quote character for string literals. `None` keeps whatever
    /// spelling a literal already has.
    pub quote: Option<QuoteStyle>,
    /// Accepted for config compatibility; the swc emitter has no dangling
    /// comma switch, so this currently has no effect.
    pub trailing_comma: bool,
}

/// Parses source text into a module, keeping the source map and comment store
/// the printer needs later.
pub fn parse(
    source: &str,
    dialect: Dialect,
) -> Result<(Module, Lrc<SourceMap>, SingleThreadedComments), Error> {
    let cm: Lrc<SourceMap> = Default::default();
    let file = cm.new_source_file(FileName::Anon.into(), source.to_string());
    let comments = SingleThreadedComments::default();

    let syntax = match dialect {
        Dialect::Typescript => Syntax::Typescript(TsSyntax::default()),
        Dialect::Ecmascript => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    };
    let lexer = Lexer::new(
        syntax,
        EsVersion::latest(),
        StringInput::from(&*file),
        Some(&comments),
    );
    let mut parser = Parser::new_from(lexer);
    let module = parser.parse_module().map_err(|err| Error::MalformedInput {
        message: err.kind().msg().to_string(),
    })?;
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(Error::MalformedInput {
            message: err.kind().msg().to_string(),
        });
    }
    Ok((module, cm, comments))
}

/// Renders a module back to source text.
pub fn print(
    module: &mut Module,
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    options: &PrintOptions,
) -> Result<String, Error> {
    if let Some(quote) = options.quote {
        module.visit_mut_with(&mut Requote {
            quote: quote.quote_char(),
        });
    }

    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: cm.clone(),
            comments: Some(comments),
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        module
            .emit_with(&mut emitter)
            .map_err(|err| Error::Emit(err.to_string()))?;
    }
    String::from_utf8(buf).map_err(|err| Error::Emit(err.to_string()))
}

/// Rewrites the raw text of every string literal so the emitter uses the
/// requested quote character.
struct Requote {
    quote: char,
}

impl VisitMut for Requote {
    fn visit_mut_str(&mut self, s: &mut Str) {
        s.raw = Some(requote(s.value.as_ref(), self.quote).into());
    }
}

fn requote(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ch if ch == quote => {
                out.push('\\');
                out.push(quote);
            }
            ch => out.push(ch),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_broken_source() {
        let Err(err) = parse("const = ;", Dialect::Typescript) else {
            panic!("syntax error");
        };
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn print_round_trips_through_the_same_store() {
        let (mut module, cm, comments) =
            parse("const a = dayjs();", Dialect::Typescript).unwrap();
        let out = print(&mut module, &cm, &comments, &PrintOptions::default()).unwrap();
        assert!(out.contains("dayjs()"));
    }

    #[test]
    fn requote_escapes_the_target_quote_only() {
        assert_eq!(requote("a'b", '\''), r"'a\'b'");
        assert_eq!(requote("a'b", '"'), r#""a'b""#);
        assert_eq!(requote("line\nbreak", '\''), r"'line\nbreak'");
        assert_eq!(requote(r"back\slash", '"'), r#""back\\slash""#);
    }
}
