
use std::env;
use std::process::exit;

#[macro_use] mod common;
mod og; mod routing;
mod ogs_extract;

const USAGE: &str = "
Usage:
  ogs <subcommand>

Available subcommands:
  extract            Extract sequences of orthology groups from proteomes
";

fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() >= 2 && args[1] == "extract" {
		ogs_extract::main();
	} else {
		eprintln!("{}", USAGE); exit(-1);
	}
}
