// src/app/erreurs.rs
//
// Erreurs de la couche application.
// Une commande refusée ou un aperçu impossible finissent ici ; rien ne remonte jusqu’à egui.

use thiserror::Error;

use crate::noyau::{ErreurNoyau, ErreurRendu};

/// Références de ligne `:N` (mode numérique).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurPretraitement {
    #[error("référence :{reference} hors de l’historique ({lignes} ligne(s))")]
    HorsBornes { reference: usize, lignes: usize },

    #[error("la ligne {0} est une définition, elle n’a pas de valeur")]
    SansValeur(usize),

    #[error("référence de ligne illisible: :{0}")]
    Malformee(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErreurCalc {
    #[error(transparent)]
    Pretraitement(#[from] ErreurPretraitement),

    #[error(transparent)]
    Evaluation(#[from] ErreurNoyau),

    #[error(transparent)]
    Rendu(#[from] ErreurRendu),
}
