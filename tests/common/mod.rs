#![allow(dead_code)]

use simple_logger::SimpleLogger;

use shiftreduce::{parse, Event, ParseOptions, ParseTables, Result, TermId, Token, Tree, TreeBuilder};

/// Safe to call from every test, only the first call installs the logger
pub fn init_logger() {
    let _ = SimpleLogger::new().init();
}

/// Tokens of length 1 at consecutive offsets
pub fn tokens(terms: &[TermId]) -> Vec<Token> {
    terms
        .iter()
        .enumerate()
        .map(|(i, t)| Token::new(*t, i, 1))
        .collect()
}

pub fn tree(tables: &ParseTables, tokens: Vec<Token>) -> Result<Tree> {
    let mut builder = TreeBuilder::new();
    parse(tables, tokens, &mut builder, ParseOptions::default())?;
    Ok(builder.finish())
}

pub fn events(tables: &ParseTables, tokens: Vec<Token>) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    parse(tables, tokens, &mut events, ParseOptions::default())?;
    Ok(events)
}
