use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    event::{Event, EventBuilder},
    parsing::{cross_section, event_header, particle, EventHeader},
    traits::{CountEvents, CrossSectionInfo, Rewind},
};

/// Generator cross section, as reported at the end of an event file
#[derive(Deserialize, Serialize, Debug, Copy, Clone, Default, PartialEq)]
pub struct CrossSection {
    pub value: f64,
    pub error: f64,
}

/// Reader for (potentially compressed) final-state hadron files
pub struct FileReader {
    source_path: PathBuf,
    source: Box<dyn BufRead>,
    line: String,
    line_nr: usize,
    next_header: Option<EventHeader>,
    cross_section: Option<CrossSection>,
}

impl FileReader {
    /// Construct a reader for the given file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let source_path = path.as_ref().to_owned();
        debug!("Reading events from {source_path:?}");
        let source = init_source(&source_path)?;
        Ok(Self {
            source_path,
            source,
            line: String::new(),
            line_nr: 0,
            next_header: None,
            cross_section: None,
        })
    }

    fn read_line(&mut self) -> Result<bool, ReadError> {
        self.line.clear();
        let nread = self
            .source
            .read_line(&mut self.line)
            .map_err(|err| ReadError::Io(self.source_path.clone(), err))?;
        if nread > 0 {
            self.line_nr += 1;
        }
        Ok(nread > 0)
    }

    fn parse_error(&self) -> ReadError {
        ReadError::Parse {
            path: self.source_path.clone(),
            line_nr: self.line_nr,
            line: self.line.trim_end().to_owned(),
        }
    }

    /// Read up to the next event header and return it
    ///
    /// Returns `None` at the end of the file
    fn read_header(&mut self) -> Result<Option<EventHeader>, ReadError> {
        if let Some(header) = self.next_header.take() {
            return Ok(Some(header));
        }
        while self.read_line()? {
            if let Some(header) = self.parse_comment()? {
                return Ok(Some(header));
            }
        }
        Ok(None)
    }

    /// Parse a comment line, returning an event header if there is one
    fn parse_comment(&mut self) -> Result<Option<EventHeader>, ReadError> {
        let line = self.line.trim();
        if !line.starts_with('#') {
            if line.is_empty() {
                return Ok(None);
            }
            return Err(self.parse_error());
        }
        if line.contains("Event") {
            return match event_header(line) {
                Ok((_, header)) => Ok(Some(header)),
                Err(_) => Err(self.parse_error()),
            };
        }
        if line.contains("sigmaGen") {
            let Ok((_, (value, error))) = cross_section(line) else {
                return Err(self.parse_error());
            };
            trace!("Cross section: {value} ± {error}");
            self.cross_section = Some(CrossSection { value, error });
        }
        Ok(None)
    }

    fn read_event(&mut self) -> Result<Option<Event>, ReadError> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };
        let nhadrons = header.n_hadrons.unwrap_or_default();
        let mut event = EventBuilder::with_capacity(header.id as usize, nhadrons);
        event
            .weight(header.weight.unwrap_or(1.))
            .ep_angle(header.ep_angle.unwrap_or_default())
            .pt_hat(header.pt_hat);
        while self.read_line()? {
            if self.line.trim_start().starts_with('#') {
                if let Some(next) = self.parse_comment()? {
                    self.next_header = Some(next);
                    break;
                }
                continue;
            }
            if self.line.trim().is_empty() {
                continue;
            }
            let Ok((_, p)) = particle(&self.line) else {
                return Err(self.parse_error());
            };
            event.add_particle(p);
        }
        if let Some(expected) = header.n_hadrons {
            if expected != event.n_particles() {
                return Err(ReadError::HadronCount {
                    path: self.source_path.clone(),
                    event: header.id,
                    expected,
                    found: event.n_particles(),
                });
            }
        }
        Ok(Some(event.build()))
    }
}

fn init_source(path: &Path) -> Result<Box<dyn BufRead>, ReadError> {
    let file = File::open(path)
        .map_err(|err| ReadError::Io(path.to_owned(), err))?;
    Ok(auto_decompress(BufReader::new(file)))
}

impl Rewind for FileReader {
    type Error = ReadError;

    fn rewind(&mut self) -> Result<(), ReadError> {
        self.source = init_source(&self.source_path)?;
        self.line.clear();
        self.line_nr = 0;
        self.next_header = None;
        Ok(())
    }
}

impl CountEvents for FileReader {
    type Error = ReadError;

    fn count_events(&mut self) -> Result<usize, ReadError> {
        let mut nevents = 0;
        for event in self.by_ref() {
            event?;
            nevents += 1;
        }
        self.rewind()?;
        Ok(nevents)
    }
}

// only known after the last event has been read
impl CrossSectionInfo for FileReader {
    fn cross_section(&self) -> Option<CrossSection> {
        self.cross_section
    }
}

impl Iterator for FileReader {
    type Item = Result<Event, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read from {0:?}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse line {line_nr} in {path:?}: `{line}`")]
    Parse {
        path: PathBuf,
        line_nr: usize,
        line: String,
    },
    #[error("Event {event} in {path:?}: expected {expected} hadrons, found {found}")]
    HadronCount {
        path: PathBuf,
        event: u32,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    const EVENTS: &str = "# JETSCAPE_FINAL_STATE\tv2\t|\tN\tpid\tstatus\tE\tPx\tPy\tPz
#\tEvent\t1\tweight\t0.5\tEPangle\t0.3\tN_hadrons\t3\t|\tN\tpid\tstatus\tE\tPx\tPy\tPz
0 211 0 5.0 3.0 4.0 0.0
1 -211 0 10.0 6.0 8.0 0.0
2 111 -1 1.0 0.6 0.8 0.0
#\tEvent\t2\tweight\t2\tEPangle\t0\tN_hadrons\t1\t|\tN\tpid\tstatus\tE\tPx\tPy\tPz
0 2212 0 20.0 12.0 16.0 0.0
#\tsigmaGen\t12.5\tsigmaErr\t0.25
";

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn read_events() {
        log_init();
        let file = write_tmp(EVENTS);
        let mut reader = FileReader::new(file.path()).unwrap();
        assert_eq!(reader.count_events().unwrap(), 2);
        assert_eq!(
            reader.cross_section(),
            Some(CrossSection { value: 12.5, error: 0.25 })
        );

        let events: Vec<_> = reader.map(|ev| ev.unwrap()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id(), 1);
        assert_eq!(events[0].weight, 0.5);
        assert_eq!(events[0].ep_angle, 0.3);
        assert_eq!(events[0].particles().len(), 3);
        assert_eq!(events[0].holes().count(), 1);
        assert_eq!(events[1].weight, 2.);
        assert_eq!(events[1].particles()[0].pt(), 20.);
    }

    #[test]
    fn bad_count() {
        log_init();
        let content = EVENTS.replace("N_hadrons\t1", "N_hadrons\t2");
        let file = write_tmp(&content);
        let reader = FileReader::new(file.path()).unwrap();
        let res: Result<Vec<_>, _> = reader.collect();
        assert!(matches!(
            res,
            Err(ReadError::HadronCount { event: 2, expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn bad_line() {
        log_init();
        let content = EVENTS.replace("0 2212 0 20.0", "0 2212 zero 20.0");
        let file = write_tmp(&content);
        let reader = FileReader::new(file.path()).unwrap();
        let res: Result<Vec<_>, _> = reader.collect();
        assert!(matches!(res, Err(ReadError::Parse { line_nr: 7, .. })));
    }
}
