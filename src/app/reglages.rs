// src/app/reglages.rs
//
// Réglages de démarrage
// ---------------------
// Priorité croissante : valeurs par défaut < fichier TOML (CALCULATRICE_CONFIG, natif) < variables
// d’environnement (CALCULATRICE_PRECISION, CALCULATRICE_DECIMAL).
// Une source invalide est journalisée puis ignorée : l’application démarre toujours.

use log::{info, warn};
use serde::Deserialize;

use super::etat::Mode;
use crate::noyau::lecture::DECIMALES_MAX;

pub const ENV_CONFIG: &str = "CALCULATRICE_CONFIG";
pub const ENV_PRECISION: &str = "CALCULATRICE_PRECISION";
pub const ENV_DECIMAL: &str = "CALCULATRICE_DECIMAL";

const PRECISION_DEFAUT: usize = 6;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Reglages {
    /// Chiffres après la virgule (affichage, références :N, lecture décimale).
    pub precision: usize,
    /// Mode algébrique : lecture décimale plutôt que forme exacte.
    pub decimal: bool,
    pub aide_visible: bool,
    pub mode_initial: Mode,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            precision: PRECISION_DEFAUT,
            decimal: false,
            aide_visible: false,
            mode_initial: Mode::Numerique,
        }
    }
}

impl Reglages {
    /// Réglages du processus (natif) : défauts, puis fichier, puis environnement.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn charger() -> Self {
        let lire_env = |cle: &str| std::env::var(cle).ok();

        let mut r = match lire_env(ENV_CONFIG) {
            Some(chemin) => Self::depuis_fichier(&chemin).unwrap_or_else(|msg| {
                warn!("réglages: {msg} ; valeurs par défaut");
                Self::default()
            }),
            None => Self::default(),
        };
        r.appliquer_env(lire_env);
        info!("réglages: {r:?}");
        r
    }

    /// Pas de fichier ni d’environnement dans le navigateur.
    #[cfg(target_arch = "wasm32")]
    pub fn charger() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn depuis_fichier(chemin: &str) -> Result<Self, String> {
        let texte = std::fs::read_to_string(chemin).map_err(|e| format!("{chemin}: {e}"))?;
        Self::depuis_toml(&texte).map_err(|e| format!("{chemin}: {e}"))
    }

    pub fn depuis_toml(texte: &str) -> Result<Self, toml::de::Error> {
        let mut r: Reglages = toml::from_str(texte)?;
        r.borner();
        Ok(r)
    }

    /// Surcharges par variables d’environnement (`lire` isole l’accès au processus).
    pub fn appliquer_env(&mut self, lire: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lire(ENV_PRECISION) {
            match v.trim().parse::<usize>() {
                Ok(p) => self.precision = p,
                Err(_) => warn!("{ENV_PRECISION}={v:?} ignoré (entier attendu)"),
            }
        }
        if let Some(v) = lire(ENV_DECIMAL) {
            match parse_bool(&v) {
                Some(b) => self.decimal = b,
                None => warn!("{ENV_DECIMAL}={v:?} ignoré (booléen attendu)"),
            }
        }
        self.borner();
    }

    fn borner(&mut self) {
        if self.precision > DECIMALES_MAX {
            warn!("précision {} ramenée à {DECIMALES_MAX}", self.precision);
            self.precision = DECIMALES_MAX;
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "oui" | "on" | "yes" => Some(true),
        "0" | "false" | "non" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(paires: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = paires
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |cle: &str| m.get(cle).cloned()
    }

    #[test]
    fn defauts() {
        let r = Reglages::default();
        assert_eq!(r.precision, 6);
        assert!(!r.decimal);
        assert_eq!(r.mode_initial, Mode::Numerique);
    }

    #[test]
    fn toml_partiel_et_borne() {
        let r = Reglages::depuis_toml("precision = 40\nmode_initial = \"algebrique\"").unwrap();
        assert_eq!(r.precision, DECIMALES_MAX);
        assert_eq!(r.mode_initial, Mode::Algebrique);
        assert!(!r.aide_visible);

        assert!(Reglages::depuis_toml("precision = \"six\"").is_err());
    }

    #[test]
    fn environnement_prioritaire() {
        let mut r = Reglages::depuis_toml("precision = 3").unwrap();
        r.appliquer_env(env(&[(ENV_PRECISION, "10"), (ENV_DECIMAL, "oui")]));
        assert_eq!(r.precision, 10);
        assert!(r.decimal);
    }

    #[test]
    fn environnement_invalide_ignore() {
        let mut r = Reglages::default();
        r.appliquer_env(env(&[(ENV_PRECISION, "beaucoup"), (ENV_DECIMAL, "peut-être")]));
        assert_eq!(r, Reglages::default());
    }
}
