use std::{env, error::Error, fs, io, process};

use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;

use shiftreduce::{embedded, parse, OwnedTables, ParseOptions, ParseTables, TermId, Token, TreeBuilder};


fn usage() -> ! {
    eprintln!("usage: shiftreduce [--dot] <sum | tables.json> <token>...");
    eprintln!("tokens are term names or ids, read as if separated by single spaces");
    process::exit(2);
}


fn term_id(arg: &str, names: &[String]) -> Option<TermId> {
    match names.iter().position(|n| n == arg) {
        Some(i) => TermId::try_from(i).ok(),
        None => arg.parse().ok(),
    }
}


fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().with_level(LevelFilter::Warn).init()?;

    let mut args: Vec<String> = env::args().skip(1).collect();
    let dot = args.first().is_some_and(|a| a == "--dot");
    if dot {
        args.remove(0);
    }
    if args.is_empty() {
        usage();
    }

    let owned;
    let (tables, names): (ParseTables, Vec<String>) = if args[0] == "sum" {
        let names = embedded::sum_names().iter().map(|s| s.to_string()).collect();
        (embedded::sum()?, names)
    } else {
        owned = OwnedTables::from_json(&fs::read_to_string(&args[0])?)?;
        (owned.view(), owned.names().to_vec())
    };
    debug!("{} states loaded from {}", tables.state_count(), args[0]);

    let mut tokens = Vec::new();
    let mut pos = 0;
    for arg in &args[1..] {
        let Some(term) = term_id(arg, &names) else {
            eprintln!("unknown term {}", arg);
            usage();
        };
        tokens.push(Token::new(term, pos, arg.len()));
        pos += arg.len() + 1;
    }

    let mut builder = TreeBuilder::new();
    parse(&tables, tokens, &mut builder, ParseOptions::default())?;
    let tree = builder.finish();

    for diagnostic in tree.errors() {
        eprintln!("recovered: {}", diagnostic.error);
    }
    if dot {
        tree.render_dot(&names, &mut io::stdout())?;
    } else {
        println!("{}", tree.visualize(&names));
    }
    Ok(())
}
