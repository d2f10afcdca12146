
use crate::og::OgCollection;
use regex::Regex;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
	NoMatch,
	ToOg(usize),
	ToGenome(usize)
}

impl Route {
	pub fn target(&self) -> Option<usize> {
		match *self {
			Route::NoMatch => None,
			Route::ToOg(index) | Route::ToGenome(index) => Some(index)
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode { PerOg, PerGenome }

#[derive(Debug, Clone, Copy)]
pub struct RouteOptions {
	pub mode: OutputMode,
	pub first_only: bool,
	pub prefix: bool
}

pub fn header_regex() -> Regex {
	Regex::new(r"^>(\S+)").unwrap_or_else(|_| error!("Invalid FASTA header pattern."))
}

/// Routes the lines of one genome's FASTA file to output indices. The route
/// is decided on header lines and reused for the body lines that follow.
pub struct GenomeRouter<'a> {
	genome: &'a str,
	genome_index: usize,
	options: RouteOptions,
	header: &'a Regex,
	og_of_gene: HashMap<&'a str, usize>,
	seen: HashSet<&'a str>,
	current: Route
}

impl<'a> GenomeRouter<'a> {
	pub fn new(collection: &'a OgCollection, genome: &'a str, genome_index: usize,
		options: RouteOptions, header: &'a Regex) -> GenomeRouter<'a> {

		let mut og_of_gene = HashMap::new();
		for (og, genes) in collection.genome_genes(genome).into_iter().enumerate() {
			let take = if options.first_only { 1 } else { genes.len() };
			for gene in genes.into_iter().take(take) {
				// Identifiers listed in several OGs go to the first one.
				og_of_gene.entry(gene.id.as_str()).or_insert(og);
			}
		}

		GenomeRouter {
			genome, genome_index, options, header, og_of_gene,
			seen: HashSet::new(), current: Route::NoMatch
		}
	}

	/// Number of distinct gene identifiers this genome can extract.
	pub fn candidates(&self) -> usize { self.og_of_gene.len() }

	/// Number of candidate identifiers matched by a header so far.
	pub fn matched(&self) -> usize { self.seen.len() }

	pub fn classify(&self, id: &str) -> Route {
		match self.og_of_gene.get(id) {
			None => Route::NoMatch,
			Some(&og) => match self.options.mode {
				OutputMode::PerOg => Route::ToOg(og),
				OutputMode::PerGenome => Route::ToGenome(self.genome_index)
			}
		}
	}

	/// Returns the output index for `line` and the text to write there, or
	/// None if the line belongs to a discarded record.
	pub fn route_line<'l>(&mut self, line: &'l str) -> Option<(usize, Cow<'l, str>)> {
		if let Some(caps) = self.header.captures(line) {
			let id = &caps[1];
			self.current = self.classify(id);
			if let Some((&key, &og)) = self.og_of_gene.get_key_value(id) {
				self.seen.insert(key);
				if self.options.prefix {
					let label = match self.options.mode {
						OutputMode::PerOg => self.genome.to_string(),
						OutputMode::PerGenome => format!("OG{}", og + 1)
					};
					let target = self.current.target()?;
					return Some((target, Cow::Owned(format!(">{}-{}", label, &line[1..]))));
				}
			}
		}
		self.current.target().map(|target| (target, Cow::Borrowed(line)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::FileReader;
	use crate::og::{read_table, GenomeRegistry};
	use std::io::Cursor;

	const TABLE: &str = "A\tB\ng1,g1b\tb1\ng2\t-\n-\tb3\n";

	fn collection() -> OgCollection {
		let mut genomes = GenomeRegistry::new();
		let mut reader = FileReader::from_reader(Cursor::new(TABLE));
		read_table(&mut reader, &mut genomes).unwrap()
	}

	fn options(mode: OutputMode) -> RouteOptions {
		RouteOptions { mode, first_only: false, prefix: false }
	}

	fn route_all(router: &mut GenomeRouter, fasta: &str) -> Vec<(usize, String)> {
		fasta.split_inclusive('\n')
			.filter_map(|line| router.route_line(line))
			.map(|(target, text)| (target, text.into_owned()))
			.collect()
	}

	#[test]
	fn classifies_by_header_identifier() {
		let ogs = collection();
		let regex = header_regex();
		let router = GenomeRouter::new(&ogs, "A", 0, options(OutputMode::PerOg), &regex);
		assert_eq!(router.candidates(), 3);
		assert_eq!(router.classify("g1b"), Route::ToOg(0));
		assert_eq!(router.classify("g2"), Route::ToOg(1));
		assert_eq!(router.classify("b1"), Route::NoMatch);
		// Exact identifiers only, never substrings.
		assert_eq!(router.classify("g"), Route::NoMatch);
		assert_eq!(router.classify("g1bx"), Route::NoMatch);

		let router = GenomeRouter::new(&ogs, "B", 1, options(OutputMode::PerGenome), &regex);
		assert_eq!(router.classify("b3"), Route::ToGenome(1));
	}

	#[test]
	fn body_lines_follow_their_header() {
		let ogs = collection();
		let regex = header_regex();
		let mut router = GenomeRouter::new(&ogs, "A", 0, options(OutputMode::PerOg), &regex);
		let routed = route_all(&mut router,
			"stray\n>g2 kinase\nMKV\nLLA\n>other\nQQQ\n>g1\nMAA\n");
		assert_eq!(routed, vec![
			(1, ">g2 kinase\n".to_string()), (1, "MKV\n".to_string()),
			(1, "LLA\n".to_string()), (0, ">g1\n".to_string()), (0, "MAA\n".to_string())
		]);
		assert_eq!(router.matched(), 2);
	}

	#[test]
	fn per_genome_prefix_names_the_og() {
		let ogs = collection();
		let regex = header_regex();
		let opts = RouteOptions { mode: OutputMode::PerGenome, first_only: false, prefix: true };
		let mut router = GenomeRouter::new(&ogs, "A", 0, opts, &regex);
		let routed = route_all(&mut router, ">g1\nM\n>g2 desc\nK\n");
		assert_eq!(routed[0], (0, ">OG1-g1\n".to_string()));
		assert_eq!(routed[2], (0, ">OG2-g2 desc\n".to_string()));
	}

	#[test]
	fn per_og_prefix_names_the_genome() {
		let ogs = collection();
		let regex = header_regex();
		let opts = RouteOptions { mode: OutputMode::PerOg, first_only: false, prefix: true };
		let mut router = GenomeRouter::new(&ogs, "B", 1, opts, &regex);
		let routed = route_all(&mut router, ">b3\nM\n>nope\nK\n");
		assert_eq!(routed, vec![(2, ">B-b3\n".to_string()), (2, "M\n".to_string())]);
	}

	#[test]
	fn first_only_keeps_leading_gene() {
		let ogs = collection();
		let regex = header_regex();
		let opts = RouteOptions { mode: OutputMode::PerOg, first_only: true, prefix: false };
		let mut router = GenomeRouter::new(&ogs, "A", 0, opts, &regex);
		assert_eq!(router.candidates(), 2);
		let routed = route_all(&mut router, ">g1b\nX\n>g1\nY\n");
		assert_eq!(routed, vec![(0, ">g1\n".to_string()), (0, "Y\n".to_string())]);
	}
}
