//! Noyau de calcul
//!
//! Organisation interne :
//! - jetons.rs     : tokenisation (décimaux exacts, alias Unicode)
//! - rpn.rs        : shunting-yard + construction Expr + lecture des définitions
//! - expr.rs       : AST exact + simplify + coeff·π + substitution
//! - canon.rs      : forme canonique (tri, signes, carrés parfaits)
//! - trig.rs       : angles remarquables + indéfini
//! - format.rs     : Expr -> LaTeX
//! - lecture.rs    : arrondis décimaux (flottants et rationnels)
//! - numerique.rs  : moteur numérique (f64, portée de variables/fonctions)
//! - symbolique.rs : moteur symbolique (exact)
//! - rendu.rs      : LaTeX -> texte Unicode affichable
//! - erreur.rs     : erreurs de lecture / d’évaluation

pub mod canon;
pub mod erreur;
pub mod expr;
pub mod format;
pub mod jetons;
pub mod lecture;
pub mod numerique;
pub mod rendu;
pub mod rpn;
pub mod symbolique;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

pub use erreur::ErreurNoyau;
pub use format::OptionsLatex;
pub use numerique::MoteurNumerique;
pub use rendu::{rendre, ErreurRendu, OptionsRendu};
pub use symbolique::MoteurSymbolique;
