use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, i32, space0, space1, u32},
    combinator::verify,
    multi::many0,
    number::complete::double,
    sequence::{pair, preceded},
    IResult,
};

use particle_id::ParticleID;

use crate::{event::Particle, four_vector::FourVector};

pub(crate) fn double_entry(line: &str) -> IResult<&str, f64> {
    preceded(space1, double)(line)
}

pub(crate) fn any_entry(line: &str) -> IResult<&str, &str> {
    preceded(space1, non_space)(line)
}

pub(crate) fn u32_entry(line: &str) -> IResult<&str, u32> {
    preceded(space1, u32)(line)
}

pub(crate) fn i32_entry(line: &str) -> IResult<&str, i32> {
    preceded(space1, i32)(line)
}

pub(crate) fn non_space(line: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_ascii_whitespace())(line)
}

fn comment_start(line: &str) -> IResult<&str, char> {
    preceded(space0, char('#'))(line)
}

/// Summary line opening an event
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct EventHeader {
    pub(crate) id: u32,
    pub(crate) weight: Option<f64>,
    pub(crate) ep_angle: Option<f64>,
    pub(crate) n_hadrons: Option<usize>,
    pub(crate) pt_hat: Option<f64>,
}

fn key_value(line: &str) -> IResult<&str, (&str, f64)> {
    pair(verify(any_entry, |key: &str| key != "|"), double_entry)(line)
}

/// Parse `# Event <id> key value key value ... | ...`
///
/// Unknown keys are ignored, everything after `|` is a column legend.
pub(crate) fn event_header(line: &str) -> IResult<&str, EventHeader> {
    let (line, _) = comment_start(line)?;
    let (line, _) = preceded(space1, tag("Event"))(line)?;
    let (line, id) = u32_entry(line)?;
    let (rest, entries) = many0(key_value)(line)?;
    let mut header = EventHeader {
        id,
        ..Default::default()
    };
    for (key, value) in entries {
        match key {
            "weight" => header.weight = Some(value),
            "EPangle" => header.ep_angle = Some(value),
            "N_hadrons" => header.n_hadrons = Some(value as usize),
            "pt_hat" => header.pt_hat = Some(value),
            _ => {}
        }
    }
    Ok((rest, header))
}

/// Parse `# sigmaGen <value> sigmaErr <value>`
pub(crate) fn cross_section(line: &str) -> IResult<&str, (f64, f64)> {
    let (line, _) = comment_start(line)?;
    let (line, xs) = preceded(preceded(space1, tag("sigmaGen")), double_entry)(line)?;
    let (line, err) = preceded(preceded(space1, tag("sigmaErr")), double_entry)(line)?;
    Ok((line, (xs, err)))
}

/// Parse `index pid status E px py pz`
pub(crate) fn particle(line: &str) -> IResult<&str, Particle> {
    let (line, _) = preceded(space0, u32)(line)?;
    let (line, pid) = i32_entry(line)?;
    let (line, status) = i32_entry(line)?;
    let (line, e) = double_entry(line)?;
    let (line, px) = double_entry(line)?;
    let (line, py) = double_entry(line)?;
    let (line, pz) = double_entry(line)?;
    let p = FourVector::from_e_px_py_pz(e, px, py, pz);
    Ok((line, Particle::new(ParticleID::new(pid), status, p)))
}
