// src/app/historique.rs
//
// Historique d’un mode
// --------------------
// - `entrees` : lignes calculées, la plus récente en tête (index 0)
// - `saisies` : textes acceptés (après prétraitement), pour le rappel ↑/↓
// Les deux listes ont des vies séparées : supprimer une ligne ne touche pas aux saisies.
// Numéro de ligne affiché = len - index (la plus ancienne est la ligne 1).

use std::collections::VecDeque;

use crate::noyau::rpn::parse_entete;

#[derive(Clone, Debug, PartialEq)]
pub struct Entree {
    pub input: String,
    /// None pour une définition ou une ligne algébrique.
    pub valeur: Option<f64>,
    pub definition: bool,
    /// Sortie déjà rendue (texte affichable).
    pub rendu: String,
}

impl Entree {
    /// Nom lié par une définition : texte avant '=', sans liste de paramètres ni ':' final.
    pub fn symbole_defini(&self) -> Option<String> {
        if !self.definition {
            return None;
        }
        let (gauche, _) = self.input.split_once('=')?;
        let gauche = gauche.trim_end();
        let gauche = gauche.strip_suffix(':').unwrap_or(gauche);
        parse_entete(gauche).map(|(nom, _)| nom)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Historique {
    entrees: VecDeque<Entree>,
    saisies: VecDeque<String>,
}

impl Historique {
    pub fn commit(&mut self, entree: Entree, saisie: String) {
        self.entrees.push_front(entree);
        self.saisies.push_front(saisie);
    }

    /// Retire la ligne `index` (0 = plus récente) ; None hors bornes.
    pub fn supprimer(&mut self, index: usize) -> Option<Entree> {
        self.entrees.remove(index)
    }

    pub fn vider(&mut self) {
        self.entrees.clear();
        self.saisies.clear();
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    pub fn entrees(&self) -> &VecDeque<Entree> {
        &self.entrees
    }

    pub fn saisies(&self) -> &VecDeque<String> {
        &self.saisies
    }

    /// Ligne affichée n (1 = la plus ancienne encore présente).
    pub fn ligne(&self, n: usize) -> Option<&Entree> {
        if n == 0 || n > self.len() {
            return None;
        }
        self.entrees.get(self.len() - n)
    }

    pub fn numero_ligne(&self, index: usize) -> usize {
        self.len() - index
    }
}
