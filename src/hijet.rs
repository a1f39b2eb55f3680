use std::path::PathBuf;

use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::event::Event;
use crate::observables::{Analysis, AnalysisError};
use crate::progress_bar::ProgressBar;
use crate::table::{write_cross_section, ObservableTable, TableError};
use crate::traits::*;

#[derive(Clone, PartialEq, Debug)]
pub struct HijetBuilder<R, A> {
    pub reader: R,
    pub analysis: A,
    /// Path of the observable table
    pub observables: PathBuf,
    /// Path of the cross section table
    pub cross_section: PathBuf,
}

impl<R, A> HijetBuilder<R, A> {
    pub fn build(self) -> Hijet<R, A> {
        Hijet {
            reader: self.reader,
            analysis: self.analysis,
            observables: self.observables,
            cross_section: self.cross_section,
        }
    }
}

impl<R, A> From<Hijet<R, A>> for HijetBuilder<R, A> {
    fn from(h: Hijet<R, A>) -> Self {
        HijetBuilder {
            reader: h.reader,
            analysis: h.analysis,
            observables: h.observables,
            cross_section: h.cross_section,
        }
    }
}

/// Event loop: read events, compute observables, write tables
#[derive(Clone, PartialEq, Debug)]
pub struct Hijet<R, A> {
    reader: R,
    analysis: A,
    observables: PathBuf,
    cross_section: PathBuf,
}

impl<R, A> From<HijetBuilder<R, A>> for Hijet<R, A> {
    fn from(b: HijetBuilder<R, A>) -> Self {
        b.build()
    }
}

#[derive(Debug, Error)]
pub enum HijetError<E1, E2> {
    #[error("Failed to read event: {0}")]
    ReadErr(E1),
    #[error("Failed to rewind reader: {0}")]
    RewindErr(E2),
    #[error("Failed to analyse event {0}: {1}")]
    AnalysisErr(usize, AnalysisError),
    #[error("Failed to write output: {0}")]
    WriteErr(TableError),
}

impl<R, J, E> Hijet<R, Analysis<J>>
where
    R: Iterator<Item = Result<Event, E>>
        + Rewind
        + CountEvents<Error = E>
        + CrossSectionInfo,
    J: FindJets,
{
    /// Analyse all events and write the output tables
    ///
    /// Returns the number of analysed events.
    pub fn run(&mut self) -> Result<usize, HijetError<E, <R as Rewind>::Error>> {
        use HijetError::*;

        self.reader.rewind().map_err(RewindErr)?;
        let nevents = self.reader.count_events().map_err(ReadErr)?;
        info!("Analysing {nevents} events");

        let mut table = ObservableTable::new(self.analysis.observables());
        let progress = ProgressBar::new(nevents as u64, "Analysing events:");
        for event in &mut self.reader {
            let event = event.map_err(ReadErr)?;
            trace!("Analysing event {}", event.id());
            let observables = self
                .analysis
                .analyze_event(&event)
                .map_err(|err| AnalysisErr(event.id(), err))?;
            table.push_event(event.weight, event.pt_hat, observables);
            progress.inc(1);
        }
        progress.finish();
        let nanalysed = table.n_rows();
        info!("Analysed {nanalysed} events");

        table.write_parquet(&self.observables).map_err(WriteErr)?;
        info!("Wrote observables to {:?}", self.observables);

        match self.reader.cross_section() {
            Some(xs) => {
                debug!("Cross section: {} ± {}", xs.value, xs.error);
                write_cross_section(&self.cross_section, &xs, nanalysed as u64)
                    .map_err(WriteErr)?;
                info!("Wrote cross section to {:?}", self.cross_section);
            }
            None => warn!("No cross section found in input"),
        }
        Ok(nanalysed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{convert::Infallible, io::Write};

    use particle_id::ParticleID;

    use crate::{
        config::AnalysisConfig,
        event::{EventBuilder, Particle},
        four_vector::FourVector,
        reader::{CrossSection, FileReader},
        table::{read_cross_section, ObservableFile, Values},
    };

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const EVENTS: &str = "# JETSCAPE_FINAL_STATE\tv2\t|\tN\tpid\tstatus\tE\tPx\tPy\tPz
#\tEvent\t1\tweight\t0.5\tEPangle\t0\tN_hadrons\t2\t|\tN\tpid\tstatus\tE\tPx\tPy\tPz
0 211 0 10.0 6.0 8.0 0.0
1 111 0 10.0 6.0 -8.0 0.0
#\tEvent\t2\tweight\t2\tEPangle\t0\tN_hadrons\t1\t|\tN\tpid\tstatus\tE\tPx\tPy\tPz
0 2212 0 20.0 0.0 3.0 0.0
#\tsigmaGen\t12.5\tsigmaErr\t0.25
";

    const CONFIG: &str = r#"
sqrt_s: 5020
jet_R: [0.4]
min_jet_pt: 10.
max_jet_y: 3.
hadron:
  pt_ch_cms:
    centrality: [[0, 10]]
    pt: [5., 400.]
    eta_cut: 1.0
hadron_correlations: {}
inclusive_chjet: {}
"#;

    #[test]
    fn run() {
        log_init();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("final_state_hadrons_0000_00.dat");
        std::fs::File::create(&input)
            .unwrap()
            .write_all(EVENTS.as_bytes())
            .unwrap();
        let observables = dir.path().join("observables_0000_00.parquet");
        let cross_section = dir.path().join("cross_section_0000_00.parquet");

        let config = AnalysisConfig::from_yaml(CONFIG).unwrap();
        let mut hijet = HijetBuilder {
            reader: FileReader::new(&input).unwrap(),
            analysis: Analysis::new(config, None).unwrap(),
            observables: observables.clone(),
            cross_section: cross_section.clone(),
        }
        .build();
        assert_eq!(hijet.run().unwrap(), 2);

        let table = ObservableFile::read(&observables).unwrap();
        assert_eq!(table.weights(), [0.5, 2.]);
        assert_eq!(table.pt_hat(), [None, None]);
        let pt = table.column("hadron_pt_ch_cms").unwrap().unwrap();
        assert_eq!(pt, [Values::Scalar(vec![10.]), Values::Scalar(vec![])]);

        let xs = read_cross_section(&cross_section).unwrap();
        assert_eq!(
            xs.cross_section,
            CrossSection {
                value: 12.5,
                error: 0.25
            }
        );
        assert_eq!(xs.n_events, 2);
    }

    /// Events held in memory
    struct EventList {
        events: Vec<Event>,
        next: usize,
        ncounted: usize,
    }

    impl Iterator for EventList {
        type Item = Result<Event, Infallible>;

        fn next(&mut self) -> Option<Self::Item> {
            let event = self.events.get(self.next).cloned()?;
            self.next += 1;
            Some(Ok(event))
        }
    }

    impl Rewind for EventList {
        type Error = Infallible;

        fn rewind(&mut self) -> Result<(), Infallible> {
            self.next = 0;
            Ok(())
        }
    }

    impl CountEvents for EventList {
        type Error = Infallible;

        fn count_events(&mut self) -> Result<usize, Infallible> {
            self.ncounted += 1;
            let nevents = self.events.len() - self.next;
            self.next = 0;
            Ok(nevents)
        }
    }

    impl CrossSectionInfo for EventList {
        fn cross_section(&self) -> Option<CrossSection> {
            None
        }
    }

    #[test]
    fn events_counted_by_source() {
        log_init();
        let dir = tempfile::tempdir().unwrap();
        let observables = dir.path().join("observables.parquet");
        let cross_section = dir.path().join("cross_section.parquet");

        let events = (0..3)
            .map(|id| {
                let mut event = EventBuilder::new(id);
                event.weight(id as f64 + 1.).add_particle(Particle::new(
                    ParticleID::new(211),
                    0,
                    FourVector::from_pt_eta_phi(10., 0., 0.),
                ));
                event.build()
            })
            .collect();
        let reader = EventList {
            events,
            next: 0,
            ncounted: 0,
        };
        let config = AnalysisConfig::from_yaml(CONFIG).unwrap();
        let mut hijet = HijetBuilder {
            reader,
            analysis: Analysis::new(config, None).unwrap(),
            observables: observables.clone(),
            cross_section: cross_section.clone(),
        }
        .build();
        assert_eq!(hijet.run().unwrap(), 3);
        assert_eq!(hijet.reader.ncounted, 1);

        let table = ObservableFile::read(&observables).unwrap();
        assert_eq!(table.weights(), [1., 2., 3.]);
        assert!(!cross_section.exists());
    }
}
