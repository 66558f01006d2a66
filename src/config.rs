use crate::Error;
use crate::sites::Source;
use std::path::PathBuf;

pub const USAGE: &str = "usage: warehouse-siting [SOURCE] [--scenario FILE] [--format text|yaml]

  SOURCE           cost table CSV (path or http(s) URL) with Fixed and Variable columns
  --scenario FILE  YAML scenario replacing the built-in regional warehouse rules
  --format FORMAT  text (default) or yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    pub source: Source,
    pub scenario: Option<PathBuf>,
    pub format: OutputFormat,
    pub help: bool,
}

impl Options {
    /// Parse `std::env::args()`-style arguments, program name first.
    pub fn from_args(args: &[String]) -> Result<Options, Error> {
        let mut options = Options::default();
        let mut source = None;
        let mut rest = args.iter().skip(1);

        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "--scenario" => {
                    let path = flag_value(&mut rest, "--scenario")?;
                    options.scenario = Some(PathBuf::from(path));
                }
                "--format" => {
                    options.format = match flag_value(&mut rest, "--format")? {
                        "text" => OutputFormat::Text,
                        "yaml" => OutputFormat::Yaml,
                        other => return Err(usage(format!("unknown format: {other}"))),
                    };
                }
                flag if flag.starts_with('-') => {
                    return Err(usage(format!("unknown option: {flag}")));
                }
                positional => {
                    if source.replace(Source::parse(positional)).is_some() {
                        return Err(usage(format!("unexpected argument: {positional}")));
                    }
                }
            }
        }

        if let Some(source) = source {
            options.source = source;
        }
        Ok(options)
    }
}

fn flag_value<'a>(
    rest: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, Error> {
    rest.next()
        .map(String::as_str)
        .ok_or_else(|| usage(format!("{flag} needs a value")))
}

fn usage(message: String) -> Error {
    Error::Usage(format!("{message}\n{USAGE}"))
}
