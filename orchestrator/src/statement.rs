use machine_learning::ModelKind;
use sqlparser::tokenizer::Token;

use crate::{
    OrchestratorError, Result,
    options::OptionValue,
    tokens::Tokens,
};

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateModel(CreateModel),
    Infer(Infer),
}

/// `CREATE MODEL <name> TYPE <type> FROM <query> INPUT (...) LABEL (...) [OPTIONS (...)]`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateModel {
    pub name: String,
    pub kind: ModelKind,
    pub query: String,
    pub input: Vec<String>,
    pub label: Vec<String>,
    pub options: Vec<(String, OptionValue)>,
}

/// `INFER <name> FROM <query> [INPUT (...)]`
#[derive(Debug, Clone, PartialEq)]
pub struct Infer {
    pub name: String,
    pub query: String,
    pub input: Option<Vec<String>>,
}

/// Parses a single statement, with or without its trailing `;`.
///
/// Keywords are case insensitive; unquoted identifiers are folded to lower case and double quoted
/// ones are kept verbatim. The query is carried as raw text up to the first top level `INPUT`.
///
/// # Arguments
/// * `sql` - The statement text.
///
/// # Returns
/// The statement, `UnknownModelType` for a type name outside the known set, or `Parse`.
pub fn parse(sql: &str) -> Result<Statement> {
    let mut tokens = Tokens::new(sql)?;

    let statement = if tokens.eat_keyword("CREATE") {
        tokens.expect_keyword("MODEL")?;
        Statement::CreateModel(parse_create_model(&mut tokens)?)
    } else if tokens.eat_keyword("INFER") {
        Statement::Infer(parse_infer(&mut tokens)?)
    } else {
        return Err(OrchestratorError::Parse(
            "expected CREATE MODEL or INFER".into(),
        ));
    };

    tokens.finish()?;
    Ok(statement)
}

fn parse_create_model(tokens: &mut Tokens) -> Result<CreateModel> {
    let name = tokens.ident("model name")?;

    tokens.expect_keyword("TYPE")?;
    let kind = tokens.ident("model type")?.parse::<ModelKind>()?;

    tokens.expect_keyword("FROM")?;
    let query = tokens.raw_until_keyword("INPUT")?;

    tokens.expect_keyword("INPUT")?;
    let input = tokens.ident_list("input column")?;

    tokens.expect_keyword("LABEL")?;
    let label = tokens.ident_list("label column")?;

    let options = if tokens.eat_keyword("OPTIONS") {
        parse_options(tokens)?
    } else {
        Vec::new()
    };

    Ok(CreateModel {
        name,
        kind,
        query,
        input,
        label,
        options,
    })
}

fn parse_infer(tokens: &mut Tokens) -> Result<Infer> {
    let name = tokens.ident("model name")?;

    tokens.expect_keyword("FROM")?;
    let query = tokens.raw_until_keyword("INPUT")?;

    let input = if tokens.eat_keyword("INPUT") {
        Some(tokens.ident_list("input column")?)
    } else {
        None
    };

    Ok(Infer { name, query, input })
}

fn parse_options(tokens: &mut Tokens) -> Result<Vec<(String, OptionValue)>> {
    tokens.expect(Token::LParen)?;

    let mut options = Vec::new();
    if tokens.eat(&Token::RParen) {
        return Ok(options);
    }

    loop {
        let key = tokens.ident("option name")?;
        tokens.expect(Token::Eq)?;
        options.push((key, parse_value(tokens)?));

        if !tokens.eat(&Token::Comma) {
            break;
        }
    }

    tokens.expect(Token::RParen)?;
    Ok(options)
}

fn parse_value(tokens: &mut Tokens) -> Result<OptionValue> {
    match tokens.next() {
        Some(Token::Minus) => match parse_value(tokens)? {
            OptionValue::Integer(n) => Ok(OptionValue::Integer(-n)),
            OptionValue::Float(n) => Ok(OptionValue::Float(-n)),
            OptionValue::String(s) => Err(OrchestratorError::Parse(format!(
                "can't negate {s}"
            ))),
        },
        Some(Token::Number(n, _)) => parse_number(&n),
        Some(Token::SingleQuotedString(s)) => Ok(OptionValue::String(s)),
        Some(Token::Word(w)) if w.quote_style.is_some() => Ok(OptionValue::String(w.value)),
        Some(Token::Word(w)) => Ok(OptionValue::String(w.value.to_lowercase())),
        Some(t) => Err(OrchestratorError::Parse(format!(
            "expected an option value, found {t}"
        ))),
        None => Err(OrchestratorError::Parse(
            "expected an option value, found end of statement".into(),
        )),
    }
}

fn parse_number(text: &str) -> Result<OptionValue> {
    let bad = || OrchestratorError::Parse(format!("invalid number: {text}"));

    if text.contains(['.', 'e', 'E']) {
        text.parse().map(OptionValue::Float).map_err(|_| bad())
    } else {
        text.parse().map(OptionValue::Integer).map_err(|_| bad())
    }
}

/// Splits a script into statements on every top level `;`, dropping empty ones.
pub fn split_script(script: &str) -> Result<Vec<String>> {
    let tokens = Tokens::new(script)?.into_inner();

    let mut statements = Vec::new();
    let mut current = String::new();

    for token in tokens {
        if token == Token::SemiColon {
            push_statement(&mut statements, &mut current);
        } else if token != Token::EOF {
            current.push_str(&token.to_string());
        }
    }
    push_statement(&mut statements, &mut current);

    Ok(statements)
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        statements.push(text.to_string());
    }
    current.clear();
}
