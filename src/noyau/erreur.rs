// src/noyau/erreur.rs
//
// Erreurs du noyau (lecture + évaluation).
// Les messages restent courts : ils finissent dans le journal, pas dans une boîte de dialogue.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErreurNoyau {
    #[error("entrée vide")]
    EntreeVide,

    #[error("caractère inattendu: '{0}'")]
    CaractereInattendu(char),

    #[error("nombre invalide: {0}")]
    NombreInvalide(String),

    #[error("parenthèses non fermées")]
    ParenthesesNonFermees,

    #[error("parenthèse fermante sans ouvrante")]
    ParentheseOrpheline,

    #[error("virgule hors d’un appel de fonction")]
    VirguleOrpheline,

    #[error("expression invalide")]
    ExpressionInvalide,

    #[error("expression trop imbriquée (plus de {0} niveaux)")]
    TropImbriquee(usize),

    #[error("{nom} attend {attendu} argument(s), reçu {recu}")]
    Arite {
        nom: String,
        attendu: usize,
        recu: usize,
    },

    #[error("symbole non défini: {0}")]
    SymboleInconnu(String),

    #[error("fonction non définie: {0}")]
    FonctionInconnue(String),

    #[error("définition invalide: {0}")]
    DefinitionInvalide(String),

    #[error("résultat indéfini (NaN)")]
    ResultatIndefini,

    #[error("récursion trop profonde dans {0}")]
    RecursionTropProfonde(String),
}
