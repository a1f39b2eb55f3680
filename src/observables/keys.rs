//! Observable key names
use super::Settings;
use crate::{
    config::{float_str, CollisionEnergy, GroomingSetting, MissingField, Number},
    table::{Dim, EventObservables},
};

pub const HOLES_SUFFIX: &str = "_holes";
pub(crate) const UNSUBTRACTED_SUFFIX: &str = "_unsubtracted";
pub(crate) const NJETS_SUFFIX: &str = "_Njets";

pub(crate) fn radius(r: f64) -> String {
    format!("_R{}", float_str(r))
}

pub(crate) fn grooming(setting: &GroomingSetting) -> String {
    format!("_zcut{}_beta{}", setting.zcut, setting.beta)
}

pub(crate) fn kappa(kappa: Number) -> String {
    format!("_k{kappa}")
}

/// Whether the observable is recorded as (jet pt, value) pairs
pub(crate) fn dim(observable: &str) -> Dim {
    if observable.contains("Dz")
        || observable.contains("Dpt")
        || matches!(observable, "mass_alice" | "mg_cms" | "zg_cms")
    {
        Dim::Pair
    } else {
        Dim::Scalar
    }
}

/// Groomed observable and radius combinations without a measurement
pub(crate) fn is_excluded(observable: &str, r: f64, setting: &GroomingSetting) -> bool {
    observable == "tg_alice" && r == 0.2 && setting.zcut.value() == 0.4
}

struct Declarations<'a> {
    observables: EventObservables,
    is_aa: bool,
    prefix: &'a str,
}

impl<'a> Declarations<'a> {
    fn add(&mut self, key: String, dim: Dim) {
        self.observables.declare(key, dim);
    }

    /// Declare `key` and, in heavy-ion runs, its unsubtracted variant
    fn add_subtracted(&mut self, key: String, dim: Dim) {
        if self.is_aa {
            self.add(format!("{key}{UNSUBTRACTED_SUFFIX}"), dim);
        }
        self.add(key, dim);
    }

    fn key(&self, observable: &str, suffix: &str) -> String {
        format!("{}_{observable}{suffix}", self.prefix)
    }
}

/// Declare the observables configured for the run
pub(crate) fn declare(settings: &Settings) -> Result<EventObservables, MissingField> {
    let config = &settings.config;
    let mut decl = Declarations {
        observables: EventObservables::new(),
        is_aa: settings.is_aa(),
        prefix: "hadron",
    };

    for observable in config.hadron.keys() {
        decl.add(decl.key(observable, ""), Dim::Scalar);
        if decl.is_aa {
            decl.add(decl.key(observable, HOLES_SUFFIX), Dim::Scalar);
        }
    }

    decl.prefix = "hadron_correlations";
    for observable in config.hadron_correlations.keys() {
        decl.add(decl.key(observable, ""), Dim::Scalar);
    }

    decl.prefix = "inclusive_jet";
    for (observable, block) in config.inclusive_jet.iter().flatten() {
        let obs_dim = dim(observable);
        for &r in block.jet_r()? {
            let r_suffix = radius(r);
            if let Some(groomings) = &block.soft_drop {
                for setting in groomings {
                    let suffix = format!("{r_suffix}{}", grooming(setting));
                    decl.add_subtracted(decl.key(observable, &suffix), obs_dim);
                }
            } else if observable.contains("charge_cms") {
                for &k in block.require(&block.kappa, "kappa")? {
                    let suffix = format!("{r_suffix}{}", kappa(k));
                    decl.add_subtracted(decl.key(observable, &suffix), obs_dim);
                }
            } else if observable.contains("Dz") || observable.contains("Dpt") {
                decl.add(decl.key(observable, &r_suffix), obs_dim);
                if decl.is_aa {
                    let key = decl.key(observable, &format!("{r_suffix}{HOLES_SUFFIX}"));
                    decl.add(key, obs_dim);
                }
                if observable.contains("Dz") {
                    let key = decl.key(observable, &format!("{r_suffix}{NJETS_SUFFIX}"));
                    decl.add(key, Dim::Scalar);
                }
            } else {
                decl.add_subtracted(decl.key(observable, &r_suffix), obs_dim);
            }
        }
    }

    decl.prefix = "inclusive_chjet";
    for (observable, block) in &config.inclusive_chjet {
        let obs_dim = dim(observable);
        for &r in block.jet_r()? {
            let r_suffix = radius(r);
            if let Some(groomings) = &block.soft_drop {
                for setting in groomings {
                    if is_excluded(observable, r, setting) {
                        continue;
                    }
                    let suffix = format!("{r_suffix}{}", grooming(setting));
                    decl.add_subtracted(decl.key(observable, &suffix), obs_dim);
                }
            } else {
                decl.add_subtracted(decl.key(observable, &r_suffix), obs_dim);
            }
        }
    }

    decl.prefix = "semi_inclusive_chjet";
    for (observable, block) in config.semi_inclusive_chjet.iter().flatten() {
        for &r in block.jet_r()? {
            let r_suffix = radius(r);
            match settings.energy {
                CollisionEnergy::Lhc2760 => {
                    for trigger in ["_lowTrigger", "_highTrigger"] {
                        let suffix = format!("{r_suffix}{trigger}");
                        decl.add_subtracted(decl.key(observable, &suffix), Dim::Scalar);
                    }
                    decl.add_subtracted(decl.key("alice_trigger_pt", ""), Dim::Scalar);
                }
                CollisionEnergy::Rhic200 => {
                    decl.add_subtracted(decl.key(observable, &r_suffix), Dim::Scalar);
                    decl.add_subtracted(decl.key("star_trigger_pt", ""), Dim::Scalar);
                }
                _ => {}
            }
        }
    }

    decl.prefix = "dijet";
    for (observable, block) in config.dijet.iter().flatten() {
        for &r in block.jet_r()? {
            decl.add_subtracted(decl.key(observable, &radius(r)), Dim::Scalar);
        }
    }

    Ok(decl.observables)
}
