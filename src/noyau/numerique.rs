// src/noyau/numerique.rs
//
// Moteur numérique (f64)
// ----------------------
// - même lecture que le noyau exact (jetons -> RPN -> Expr), évaluation en flottants
// - portée : variables (valeur figée à l’affectation) et fonctions utilisateur
// - intégrées : sqrt sin cos tan (lus par le parseur) asin acos atan sinh cosh tanh exp ln log log10
//   abs floor ceil round min max ; constantes pi, e
// - les fonctions utilisateur peuvent s’appeler elles-mêmes : profondeur bornée

use std::collections::HashMap;
use std::f64::consts::{E, PI};

use log::debug;

use super::erreur::ErreurNoyau;
use super::expr::Expr;
use super::format::{format_latex, latex_entete, OptionsLatex};
use super::lecture::rationnel_vers_f64;
use super::rpn::{parse_definition, parse_expression, Definition};

/// Garde-fou contre f(x) := f(x) + 1.
const PROFONDEUR_MAX: usize = 64;

/// Noms lus comme Sqrt/Sin/Cos/Tan par le parseur : impossible de les redéfinir.
pub(crate) const RESERVES: &[&str] = &["sqrt", "sin", "cos", "tan"];

#[derive(Clone, Debug, PartialEq)]
pub enum Liaison {
    Valeur(f64),
    Fonction { parametres: Vec<String>, corps: Expr },
}

#[derive(Clone, Debug, Default)]
pub struct MoteurNumerique {
    portee: HashMap<String, Liaison>,
}

impl MoteurNumerique {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valeur d’une expression (pas de définition ici). NaN est refusé, ±∞ accepté.
    pub fn evaluer(&self, texte: &str) -> Result<f64, ErreurNoyau> {
        let e = parse_expression(texte)?;
        let v = self.valeur_expr(&e)?;
        if v.is_nan() {
            return Err(ErreurNoyau::ResultatIndefini);
        }
        Ok(v)
    }

    /// `a = expr` (valeur calculée maintenant) ou `f(x, …) = expr` (corps gardé).
    /// La portée n’est modifiée qu’une fois tout calculé.
    pub fn affecter(&mut self, texte: &str) -> Result<(), ErreurNoyau> {
        let Definition {
            nom,
            parametres,
            corps,
        } = parse_definition(texte)?
            .ok_or_else(|| ErreurNoyau::DefinitionInvalide(texte.trim().to_string()))?;

        if RESERVES.contains(&nom.as_str()) {
            return Err(ErreurNoyau::DefinitionInvalide(nom));
        }

        let liaison = match parametres {
            Some(parametres) => Liaison::Fonction { parametres, corps },
            None => {
                let v = self.valeur_expr(&corps)?;
                if v.is_nan() {
                    return Err(ErreurNoyau::ResultatIndefini);
                }
                Liaison::Valeur(v)
            }
        };

        debug!("numérique: {nom} lié ({liaison:?})");
        self.portee.insert(nom, liaison);
        Ok(())
    }

    /// Retire un symbole ; false s’il n’était pas lié.
    pub fn retirer(&mut self, nom: &str) -> bool {
        self.portee.remove(nom).is_some()
    }

    pub fn tout_effacer(&mut self) {
        self.portee.clear();
    }

    pub fn est_lie(&self, nom: &str) -> bool {
        self.portee.contains_key(nom)
    }

    /// Forme d’affichage : l’expression, ou `tête:=corps` pour une définition.
    pub fn latex(&self, texte: &str, options: &OptionsLatex) -> Result<String, ErreurNoyau> {
        match parse_definition(texte)? {
            Some(d) => Ok(format!(
                "{}:={}",
                latex_entete(&d.nom, d.parametres.as_deref()),
                format_latex(&d.corps, options)
            )),
            None => Ok(format_latex(&parse_expression(texte)?, options)),
        }
    }

    /* ------------------------ Évaluation ------------------------ */

    pub(crate) fn valeur_expr(&self, e: &Expr) -> Result<f64, ErreurNoyau> {
        self.valeur(e, &HashMap::new(), 0)
    }

    fn valeur(
        &self,
        e: &Expr,
        locales: &HashMap<String, f64>,
        profondeur: usize,
    ) -> Result<f64, ErreurNoyau> {
        use Expr::*;

        let v = |x: &Expr| self.valeur(x, locales, profondeur);

        Ok(match e {
            Rat(r) => rationnel_vers_f64(r),
            Pi => PI,
            Indefini => f64::NAN,
            Var(nom) => self.variable(nom, locales)?,

            Sqrt(x) => v(x)?.sqrt(),
            Pow(a, b) => v(a)?.powf(v(b)?),
            Sin(x) => v(x)?.sin(),
            Cos(x) => v(x)?.cos(),
            Tan(x) => v(x)?.tan(),

            Add(a, b) => v(a)? + v(b)?,
            Sub(a, b) => v(a)? - v(b)?,
            Mul(a, b) | Implicite(a, b) => v(a)? * v(b)?,
            Div(a, b) => v(a)? / v(b)?,

            Fonction(nom, args) => {
                let args = args.iter().map(v).collect::<Result<Vec<f64>, _>>()?;
                self.appel(nom, &args, profondeur)?
            }
        })
    }

    fn variable(&self, nom: &str, locales: &HashMap<String, f64>) -> Result<f64, ErreurNoyau> {
        if let Some(v) = locales.get(nom) {
            return Ok(*v);
        }
        match self.portee.get(nom) {
            Some(Liaison::Valeur(v)) => Ok(*v),
            Some(Liaison::Fonction { .. }) => Err(ErreurNoyau::SymboleInconnu(nom.to_string())),
            None if nom == "e" => Ok(E),
            None => Err(ErreurNoyau::SymboleInconnu(nom.to_string())),
        }
    }

    fn appel(&self, nom: &str, args: &[f64], profondeur: usize) -> Result<f64, ErreurNoyau> {
        // l’utilisateur masque les intégrées
        if let Some(Liaison::Fonction { parametres, corps }) = self.portee.get(nom) {
            if parametres.len() != args.len() {
                return Err(ErreurNoyau::Arite {
                    nom: nom.to_string(),
                    attendu: parametres.len(),
                    recu: args.len(),
                });
            }
            if profondeur >= PROFONDEUR_MAX {
                return Err(ErreurNoyau::RecursionTropProfonde(nom.to_string()));
            }
            let locales: HashMap<String, f64> =
                parametres.iter().cloned().zip(args.iter().copied()).collect();
            return self.valeur(corps, &locales, profondeur + 1);
        }

        integree(nom, args).unwrap_or_else(|| Err(ErreurNoyau::FonctionInconnue(nom.to_string())))
    }
}

/// Fonctions intégrées ; None si le nom est inconnu.
pub(crate) fn integree(nom: &str, args: &[f64]) -> Option<Result<f64, ErreurNoyau>> {
    let unaire = |f: fn(f64) -> f64| match args {
        [x] => Ok(f(*x)),
        _ => Err(ErreurNoyau::Arite {
            nom: nom.to_string(),
            attendu: 1,
            recu: args.len(),
        }),
    };

    let r = match nom {
        "asin" => unaire(f64::asin),
        "acos" => unaire(f64::acos),
        "atan" => unaire(f64::atan),
        "sinh" => unaire(f64::sinh),
        "cosh" => unaire(f64::cosh),
        "tanh" => unaire(f64::tanh),
        "exp" => unaire(f64::exp),
        "ln" => unaire(f64::ln),
        "log10" => unaire(f64::log10),
        "abs" => unaire(f64::abs),
        "floor" => unaire(f64::floor),
        "ceil" => unaire(f64::ceil),
        "round" => unaire(f64::round),

        // log(x) = ln(x), log(x, b) = logarithme en base b
        "log" => match args {
            [x] => Ok(x.ln()),
            [x, b] => Ok(x.ln() / b.ln()),
            _ => Err(ErreurNoyau::Arite {
                nom: nom.to_string(),
                attendu: 1,
                recu: args.len(),
            }),
        },

        "min" | "max" => {
            if args.is_empty() {
                Err(ErreurNoyau::Arite {
                    nom: nom.to_string(),
                    attendu: 1,
                    recu: 0,
                })
            } else if nom == "min" {
                Ok(args.iter().copied().fold(f64::INFINITY, f64::min))
            } else {
                Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }
        }

        _ => return None,
    };
    Some(r)
}
