// src/app/adaptateur.rs
//
// Adaptateur vers les moteurs
// ---------------------------
// Un texte déjà prétraité part vers le moteur du mode :
// - contient '=' : définition (symbole lié, pas de valeur)
// - sinon        : évaluation (valeur numérique, ou forme exacte / décimale en algébrique)
//
// Contrat : tout est calculé (LaTeX, rendu, valeur) AVANT de toucher aux portées.
// Une erreur n’importe où => Err, et aucun moteur n’a changé.

use log::debug;

use super::erreurs::ErreurCalc;
use super::etat::Mode;
use super::historique::Entree;
use crate::noyau::format::{format_latex, latex_entete, latex_flottant};
use crate::noyau::rpn::{parse_definition, Definition};
use crate::noyau::{rendre, MoteurNumerique, MoteurSymbolique, OptionsLatex, OptionsRendu};

const AFFICHAGE: OptionsRendu = OptionsRendu { affichage: true };

#[derive(Clone, Debug, Default)]
pub struct Adaptateur {
    numerique: MoteurNumerique,
    symbolique: MoteurSymbolique,
}

impl Adaptateur {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn numerique(&self) -> &MoteurNumerique {
        &self.numerique
    }

    /// Exécute une commande ; l’entrée d’historique est rendue seulement si tout a réussi.
    pub fn executer(
        &mut self,
        mode: Mode,
        texte: &str,
        decimal: bool,
        precision: usize,
    ) -> Result<Entree, ErreurCalc> {
        let entree = match mode {
            Mode::Numerique => self.executer_numerique(texte, precision)?,
            Mode::Algebrique => self.executer_algebrique(texte, decimal, precision)?,
        };
        debug!("{mode:?}: {texte:?} -> {:?}", entree.rendu);
        Ok(entree)
    }

    /// Aperçu typographié de la saisie, sans évaluation ni mutation.
    pub fn apercu(&self, mode: Mode, texte: &str) -> Result<String, ErreurCalc> {
        let latex = self.latex_saisie(mode, texte)?;
        Ok(rendre(&latex, AFFICHAGE)?)
    }

    /// Délie le symbole d’une définition supprimée de l’historique.
    /// Mode algébrique : le moteur symbolique ne sait pas retirer une liaison, elle reste.
    pub fn retirer_symbole(&mut self, mode: Mode, entree: &Entree) -> bool {
        match (mode, entree.symbole_defini()) {
            (Mode::Numerique, Some(nom)) => {
                let retire = self.numerique.retirer(&nom);
                debug!("numérique: {nom} délié ({retire})");
                retire
            }
            (Mode::Algebrique, Some(nom)) => {
                debug!("algébrique: {nom} reste lié");
                false
            }
            (_, None) => false,
        }
    }

    /// Vide la portée du moteur de ce mode (l’autre moteur est intact).
    pub fn reinitialiser(&mut self, mode: Mode) {
        match mode {
            Mode::Numerique => self.numerique.tout_effacer(),
            Mode::Algebrique => {
                self.symbolique.tout_reinitialiser();
                self.symbolique.effacer_variables();
            }
        }
    }

    /* ------------------------ Numérique ------------------------ */

    fn executer_numerique(&mut self, texte: &str, precision: usize) -> Result<Entree, ErreurCalc> {
        let latex = self.numerique.latex(texte, &OptionsLatex::SAISIE)?;

        if texte.contains('=') {
            let rendu = rendre(&latex, AFFICHAGE)?;
            self.numerique.affecter(texte)?;
            return Ok(Entree {
                input: texte.to_string(),
                valeur: None,
                definition: true,
                rendu,
            });
        }

        let v = self.numerique.evaluer(texte)?;
        let rendu = rendre(&format!("{latex}={}", latex_flottant(v, precision)), AFFICHAGE)?;
        Ok(Entree {
            input: texte.to_string(),
            valeur: Some(v),
            definition: false,
            rendu,
        })
    }

    /* ------------------------ Algébrique ------------------------ */

    fn executer_algebrique(
        &mut self,
        texte: &str,
        decimal: bool,
        precision: usize,
    ) -> Result<Entree, ErreurCalc> {
        if let Some(def) = parse_definition(texte)? {
            let rendu = rendre(&latex_definition(&def), AFFICHAGE)?;
            match &def.parametres {
                Some(parametres) => {
                    self.symbolique
                        .definir_fonction(&def.nom, parametres, &def.corps)?
                }
                None => self.symbolique.definir_variable(&def.nom, &def.corps)?,
            }
            return Ok(Entree {
                input: texte.to_string(),
                valeur: None,
                definition: true,
                rendu,
            });
        }

        let gauche = self.symbolique.convertir_latex(texte)?;
        let droite = if decimal {
            self.symbolique.evaluer_numerique(texte, precision)?
        } else {
            self.symbolique.simplifier(texte)?
        };
        let rendu = rendre(&format!("{gauche}={droite}"), AFFICHAGE)?;
        Ok(Entree {
            input: texte.to_string(),
            valeur: None,
            definition: false,
            rendu,
        })
    }

    fn latex_saisie(&self, mode: Mode, texte: &str) -> Result<String, ErreurCalc> {
        Ok(match mode {
            Mode::Numerique => self.numerique.latex(texte, &OptionsLatex::SAISIE)?,
            Mode::Algebrique => match parse_definition(texte)? {
                Some(def) => latex_definition(&def),
                None => self.symbolique.convertir_latex(texte)?,
            },
        })
    }
}

fn latex_definition(def: &Definition) -> String {
    format!(
        "{}:={}",
        latex_entete(&def.nom, def.parametres.as_deref()),
        format_latex(&def.corps, &OptionsLatex::SAISIE)
    )
}
