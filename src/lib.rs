pub mod ast_printer;
pub mod error;
pub mod expr;
pub mod fold;
pub mod literal;
pub mod ops;
pub mod parser;
pub mod scanner;
pub mod stream;
pub mod token;
pub mod value;

pub use error::{ParseError, Result};
pub use expr::{EvalExpr, Expr};
pub use fold::Foldable;
pub use parser::{parse_expr, parse_expression, ExprParser, ParserConfig};
pub use stream::{TokenBuffer, TokenStream};
pub use value::Value;
