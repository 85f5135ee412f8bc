//! src/app/etat.rs
//!
//! État de l’application (sans egui).
//!
//! Rôle : un seul `AppCalc` explicite, modifié uniquement par des `Evenement`
//! (`AppCalc::traiter` / `mise_a_jour`). La vue ne fait que lire l’état et émettre des événements.
//!
//! Contrats :
//! - chaque mode a son brouillon, son historique et son navigateur ; changer de mode n’efface rien
//! - commande refusée => historique, brouillon et portées inchangés
//! - l’aperçu ne modifie rien et ne panique jamais

use log::{info, trace, warn};
use serde::Deserialize;

use super::adaptateur::Adaptateur;
use super::erreurs::ErreurCalc;
use super::historique::Historique;
use super::navigation::{Direction, Navigateur};
use super::pretraitement::pretraiter;
use super::reglages::Reglages;

/// Remplace l’aperçu quand la saisie ne se lit pas (encore).
pub const APERCU_INDISPONIBLE: &str = "…";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Numerique,
    Algebrique,
}

impl Mode {
    pub fn autre(self) -> Mode {
        match self {
            Mode::Numerique => Mode::Algebrique,
            Mode::Algebrique => Mode::Numerique,
        }
    }

    pub fn libelle(self) -> &'static str {
        match self {
            Mode::Numerique => "Numérique",
            Mode::Algebrique => "Algébrique",
        }
    }
}

/// Ce qui appartient à un seul mode.
#[derive(Clone, Debug, Default)]
pub struct EtatMode {
    pub brouillon: String,
    pub historique: Historique,
    pub navigateur: Navigateur,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Evenement {
    /// Le champ de saisie a changé.
    Saisie(String),
    Executer,
    Rappel(Direction),
    /// Index dans l’historique du mode actif (0 = plus récente).
    Supprimer(usize),
    EffacerTout,
    BasculerMode,
    ChoisirMode(Mode),
    BasculerDecimal,
    BasculerAide,
    EffacerBrouillon,
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    pub mode: Mode,
    pub numerique: EtatMode,
    pub algebrique: EtatMode,
    pub adaptateur: Adaptateur,

    // --- paramètres ---
    pub precision: usize,
    pub decimal: bool,
    pub aide_visible: bool,

    // --- UX ---
    /// Dernier refus, affiché sous la saisie ; effacé au prochain succès.
    pub erreur: Option<String>,
    /// Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self::new(Reglages::default())
    }
}

/// Forme “fonction pure” de `traiter` : l’état entre, l’état sort.
pub fn mise_a_jour(mut etat: AppCalc, evenement: Evenement) -> (AppCalc, bool) {
    let ok = etat.traiter(evenement);
    (etat, ok)
}

impl AppCalc {
    pub fn new(reglages: Reglages) -> Self {
        Self {
            mode: reglages.mode_initial,
            numerique: EtatMode::default(),
            algebrique: EtatMode::default(),
            adaptateur: Adaptateur::new(),
            precision: reglages.precision,
            decimal: reglages.decimal,
            aide_visible: reglages.aide_visible,
            erreur: None,
            focus_entree: true,
        }
    }

    pub fn etat(&self) -> &EtatMode {
        match self.mode {
            Mode::Numerique => &self.numerique,
            Mode::Algebrique => &self.algebrique,
        }
    }

    fn etat_mut(&mut self) -> &mut EtatMode {
        match self.mode {
            Mode::Numerique => &mut self.numerique,
            Mode::Algebrique => &mut self.algebrique,
        }
    }

    /// Applique un événement ; false s’il a été refusé ou n’a rien changé.
    pub fn traiter(&mut self, evenement: Evenement) -> bool {
        match evenement {
            Evenement::Saisie(texte) => {
                self.etat_mut().brouillon = texte;
                true
            }
            Evenement::Executer => self.executer(),
            Evenement::Rappel(direction) => {
                let EtatMode {
                    brouillon,
                    historique,
                    navigateur,
                } = self.etat_mut();
                navigateur.rappeler(direction, historique.saisies(), brouillon)
            }
            Evenement::Supprimer(index) => self.supprimer(index),
            Evenement::EffacerTout => {
                let mode = self.mode;
                let etat = self.etat_mut();
                etat.historique.vider();
                etat.navigateur.reinitialiser();
                self.adaptateur.reinitialiser(mode);
                info!("{mode:?}: historique et symboles effacés");
                true
            }
            Evenement::BasculerMode => self.changer_mode(self.mode.autre()),
            Evenement::ChoisirMode(mode) => self.changer_mode(mode),
            Evenement::BasculerDecimal => {
                self.decimal = !self.decimal;
                true
            }
            Evenement::BasculerAide => {
                self.aide_visible = !self.aide_visible;
                true
            }
            Evenement::EffacerBrouillon => {
                let etat = self.etat_mut();
                etat.brouillon.clear();
                etat.navigateur.reinitialiser();
                self.focus_entree = true;
                true
            }
        }
    }

    /// Aperçu du brouillon actif : Ok("") si rien à montrer.
    pub fn apercu(&self) -> Result<String, ErreurCalc> {
        let etat = self.etat();
        if etat.brouillon.trim().is_empty() {
            return Ok(String::new());
        }
        let texte = pretraiter(&etat.brouillon, self.mode, &etat.historique, self.precision)?;
        if texte.is_empty() {
            return Ok(String::new());
        }
        let rendu = self.adaptateur.apercu(self.mode, &texte);
        trace!("aperçu {texte:?} -> {rendu:?}");
        rendu
    }

    pub fn apercu_affichable(&self) -> String {
        self.apercu()
            .unwrap_or_else(|_| APERCU_INDISPONIBLE.to_string())
    }

    /* ------------------------ Transitions ------------------------ */

    fn executer(&mut self) -> bool {
        let mode = self.mode;
        let etat = match mode {
            Mode::Numerique => &mut self.numerique,
            Mode::Algebrique => &mut self.algebrique,
        };

        let resultat = pretraiter(&etat.brouillon, mode, &etat.historique, self.precision)
            .map_err(ErreurCalc::from)
            .and_then(|texte| {
                self.adaptateur
                    .executer(mode, &texte, self.decimal, self.precision)
                    .map(|entree| (entree, texte))
            });

        self.focus_entree = true;
        match resultat {
            Ok((entree, texte)) => {
                etat.historique.commit(entree, texte);
                etat.brouillon.clear();
                etat.navigateur.reinitialiser();
                self.erreur = None;
                true
            }
            Err(e) => {
                warn!("{mode:?}: {:?} refusé: {e}", etat.brouillon);
                self.erreur = Some(e.to_string());
                false
            }
        }
    }

    fn supprimer(&mut self, index: usize) -> bool {
        let mode = self.mode;
        let Some(entree) = self.etat_mut().historique.supprimer(index) else {
            return false;
        };
        if entree.definition {
            self.adaptateur.retirer_symbole(mode, &entree);
        }
        true
    }

    fn changer_mode(&mut self, mode: Mode) -> bool {
        if mode == self.mode {
            return false;
        }
        info!("mode {:?} -> {mode:?}", self.mode);
        self.mode = mode;
        self.erreur = None;
        self.focus_entree = true;
        true
    }
}
