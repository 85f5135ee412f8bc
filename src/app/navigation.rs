// src/app/navigation.rs
//
// Rappel des saisies (↑ / ↓)
// --------------------------
// curseur None = brouillon en cours ; Some(i) = saisies[i] (0 = la plus récente).
// Quitter le brouillon le met de côté, y revenir le restaure. Pas de bouclage.

use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// ↑
    PlusAncien,
    /// ↓
    PlusRecent,
}

#[derive(Clone, Debug, Default)]
pub struct Navigateur {
    curseur: Option<usize>,
    brouillon_temp: String,
}

impl Navigateur {
    pub fn curseur(&self) -> Option<usize> {
        self.curseur
    }

    /// Déplace le curseur et charge le brouillon ; false si rien n’a bougé (bord atteint).
    pub fn rappeler(
        &mut self,
        direction: Direction,
        saisies: &VecDeque<String>,
        brouillon: &mut String,
    ) -> bool {
        let suivant = match (direction, self.curseur) {
            (Direction::PlusAncien, None) if !saisies.is_empty() => Some(0),
            (Direction::PlusAncien, Some(i)) if i + 1 < saisies.len() => Some(i + 1),
            (Direction::PlusRecent, Some(0)) => None,
            (Direction::PlusRecent, Some(i)) => Some(i - 1),
            _ => return false,
        };

        if self.curseur.is_none() {
            self.brouillon_temp = std::mem::take(brouillon);
        }

        match suivant {
            Some(i) => match saisies.get(i) {
                Some(s) => *brouillon = s.clone(),
                // liste raccourcie entre deux rappels : on rentre au brouillon
                None => return self.revenir(brouillon),
            },
            None => return self.revenir(brouillon),
        }
        self.curseur = suivant;
        true
    }

    /// Oublie la navigation (après un commit ou un effacement).
    pub fn reinitialiser(&mut self) {
        self.curseur = None;
        self.brouillon_temp.clear();
    }

    fn revenir(&mut self, brouillon: &mut String) -> bool {
        *brouillon = std::mem::take(&mut self.brouillon_temp);
        self.curseur = None;
        true
    }
}
