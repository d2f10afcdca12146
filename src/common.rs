
use docopt::{Docopt, ArgvMap};
use flate2::read::MultiGzDecoder;
use std::io::{self, stdin, BufRead, BufReader};
use std::fs::File;

macro_rules! error {
	($($arg:tt)+) => ({
		use std::process::exit;
		eprint!("ERROR: "); eprintln!($($arg)+); exit(-1);
	})
}

pub fn parse_args(usage: &str) -> ArgvMap {
	Docopt::new(usage).and_then(|d| d.help(true).parse()).unwrap_or_else(|e| {
		if e.fatal() { error!("Invalid arguments.\n{}", usage); }
		e.exit()
	})
}

pub trait PathArgs {
	fn get_path(&self, arg: &str) -> String;
}

impl PathArgs for ArgvMap {
	fn get_path(&self, arg: &str) -> String {
		expand_home(self.get_str(arg), std::env::var("HOME").ok().as_deref())
	}
}

fn expand_home(path: &str, home: Option<&str>) -> String {
	match home {
		Some(home) if path.starts_with('~') => format!("{}{}", home, &path[1..]),
		_ => path.into()
	}
}

pub struct FileReader {
	bufread: Box<dyn BufRead>
}

impl FileReader {
	// Paths ending in .gz are decompressed, "-" reads standard input. Corrupt
	// gzip data surfaces as an error from read_line.
	pub fn open(path: &str) -> io::Result<FileReader> {
		if path == "-" {
			return Ok(FileReader::from_reader(BufReader::new(stdin())));
		}
		let file = File::open(path)?;
		if path.ends_with(".gz") {
			Ok(FileReader::from_reader(BufReader::new(MultiGzDecoder::new(file))))
		} else {
			Ok(FileReader::from_reader(BufReader::new(file)))
		}
	}

	pub fn from_reader<R: BufRead + 'static>(reader: R) -> FileReader {
		FileReader { bufread: Box::new(reader) }
	}

	// Returns false at end of input. The line keeps its terminator.
	pub fn read_line(&mut self, line: &mut String) -> io::Result<bool> {
		line.clear();
		Ok(self.bufread.read_line(line)? > 0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use flate2::write::GzEncoder;
	use flate2::Compression;
	use std::io::{Cursor, Write};
	use tempfile::TempDir;

	#[test]
	fn reads_lines_with_terminators() {
		let mut reader = FileReader::from_reader(Cursor::new("a\tb\nlast"));
		let mut line = String::new();
		assert!(reader.read_line(&mut line).unwrap());
		assert_eq!(line, "a\tb\n");
		assert!(reader.read_line(&mut line).unwrap());
		assert_eq!(line, "last");
		assert!(!reader.read_line(&mut line).unwrap());
		assert!(line.is_empty());
	}

	#[test]
	fn opens_plain_files() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("x.faa");
		writeln!(File::create(&path).unwrap(), ">g1\nMKV").unwrap();

		let mut reader = FileReader::open(path.to_str().unwrap()).unwrap();
		let mut line = String::new();
		reader.read_line(&mut line).unwrap();
		assert_eq!(line, ">g1\n");
	}

	#[test]
	fn missing_file_is_an_error() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("absent.faa");
		assert!(FileReader::open(path.to_str().unwrap()).is_err());
	}

	#[test]
	fn home_is_expanded() {
		assert_eq!(expand_home("~/seqs/%s.faa", Some("/home/someone")),
			"/home/someone/seqs/%s.faa");
		assert_eq!(expand_home("/abs/%s.faa", Some("/home/someone")), "/abs/%s.faa");
		assert_eq!(expand_home("~/seqs/%s.faa", None), "~/seqs/%s.faa");
	}

	#[test]
	fn decompresses_gzip_files() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("x.faa.gz");
		let mut gz = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
		gz.write_all(b">g1\nMKV\n").unwrap();
		gz.finish().unwrap();

		let mut reader = FileReader::open(path.to_str().unwrap()).unwrap();
		let mut line = String::new();
		assert!(reader.read_line(&mut line).unwrap());
		assert_eq!(line, ">g1\n");
		assert!(reader.read_line(&mut line).unwrap());
		assert_eq!(line, "MKV\n");
		assert!(!reader.read_line(&mut line).unwrap());
	}

	#[test]
	fn corrupt_gzip_is_a_read_error() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("x.faa.gz");
		File::create(&path).unwrap().write_all(b"not gzip at all\n").unwrap();

		let mut reader = FileReader::open(path.to_str().unwrap()).unwrap();
		let mut line = String::new();
		assert!(reader.read_line(&mut line).is_err());
	}
}
