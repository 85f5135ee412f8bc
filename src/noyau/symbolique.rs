// src/noyau/symbolique.rs
//
// Moteur symbolique (exact)
// -------------------------
// Pipeline d’une évaluation :
//   texte -> Expr -> développement (variables, fonctions utilisateur)
//        -> simplify -> angles remarquables -> simplify -> intégrées exactes -> canon
//
// - une variable garde la valeur développée au moment de sa définition (a = a + 1 est sûr)
// - une fonction garde son corps brut ; il est développé à chaque appel (profondeur bornée)
// - lecture décimale : constantes approchées, variables libres conservées

use std::collections::HashMap;

use log::{debug, trace};
use num_rational::BigRational;
use num_traits::Signed;

use super::erreur::ErreurNoyau;
use super::expr::Expr;
use super::format::{format_latex, latex_flottant, OptionsLatex};
use super::numerique::{MoteurNumerique, RESERVES};
use super::rpn::{parse_expression, PROFONDEUR_MAX as IMBRICATION_MAX};
use super::trig::appliquer_trig_speciale;

const PROFONDEUR_MAX: usize = 64;

#[derive(Clone, Debug, Default)]
pub struct MoteurSymbolique {
    variables: HashMap<String, Expr>,
    fonctions: HashMap<String, (Vec<String>, Expr)>,
}

impl MoteurSymbolique {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saisie -> LaTeX, sans évaluation.
    pub fn convertir_latex(&self, texte: &str) -> Result<String, ErreurNoyau> {
        Ok(format_latex(&parse_expression(texte)?, &OptionsLatex::SAISIE))
    }

    pub fn definir_variable(&mut self, nom: &str, valeur: &Expr) -> Result<(), ErreurNoyau> {
        let valeur = self.developper_borne(valeur)?;
        debug!("symbolique: {nom} = {valeur}");
        self.variables.insert(nom.to_string(), valeur);
        Ok(())
    }

    pub fn definir_fonction(
        &mut self,
        nom: &str,
        parametres: &[String],
        corps: &Expr,
    ) -> Result<(), ErreurNoyau> {
        if RESERVES.contains(&nom) {
            return Err(ErreurNoyau::DefinitionInvalide(nom.to_string()));
        }
        debug!("symbolique: {nom}({}) = {corps}", parametres.join(","));
        self.fonctions
            .insert(nom.to_string(), (parametres.to_vec(), corps.clone()));
        Ok(())
    }

    /// Forme exacte canonique, en LaTeX.
    pub fn simplifier(&self, texte: &str) -> Result<String, ErreurNoyau> {
        let e = self.reduire(texte)?;
        Ok(format_latex(&e, &OptionsLatex::EXACT))
    }

    /// Lecture décimale à `precision` chiffres.
    /// Sans variable libre : un nombre ; sinon les constantes sont approchées dans l’expression.
    pub fn evaluer_numerique(&self, texte: &str, precision: usize) -> Result<String, ErreurNoyau> {
        let e = self.reduire(texte)?;
        let calcul = MoteurNumerique::new();

        if !e.contient_var() {
            let v = calcul.valeur_expr(&e)?;
            if v.is_nan() {
                return Err(ErreurNoyau::ResultatIndefini);
            }
            return Ok(latex_flottant(v, precision));
        }

        let approchee = e.transformer(&mut |n: &Expr| {
            if n.contient_var() || matches!(n, Expr::Rat(_)) {
                return None;
            }
            match calcul.valeur_expr(n) {
                Ok(v) if v.is_finite() => BigRational::from_float(v).map(Expr::Rat),
                _ => None,
            }
        });
        Ok(format_latex(&approchee, &OptionsLatex::decimal(precision)))
    }

    pub fn tout_reinitialiser(&mut self) {
        self.variables.clear();
        self.fonctions.clear();
    }

    pub fn effacer_variables(&mut self) {
        self.variables.clear();
    }

    /* ------------------------ Pipeline ------------------------ */

    fn reduire(&self, texte: &str) -> Result<Expr, ErreurNoyau> {
        let e = self.developper_borne(&parse_expression(texte)?)?;
        trace!("développé: {e}");

        let e = e.simplify();
        let e = appliquer_trig_speciale(&e).simplify();
        let e = plier_integrees(&e).simplify().canon();
        trace!("réduit: {e}");
        Ok(e)
    }

    /// Développement complet ; l’arbre obtenu reste sous la même imbrication qu’une saisie.
    fn developper_borne(&self, e: &Expr) -> Result<Expr, ErreurNoyau> {
        let out = self.developper(e, 0)?;
        if out.depasse_profondeur(IMBRICATION_MAX) {
            return Err(ErreurNoyau::TropImbriquee(IMBRICATION_MAX));
        }
        Ok(out)
    }

    /// Remplace les variables liées et déroule les appels de fonctions utilisateur.
    fn developper(&self, e: &Expr, profondeur: usize) -> Result<Expr, ErreurNoyau> {
        let mut erreur: Option<ErreurNoyau> = None;

        let out = e.transformer(&mut |n: &Expr| {
            if erreur.is_some() {
                return Some(Expr::Indefini);
            }
            match n {
                Expr::Var(nom) => self.variables.get(nom).cloned(),
                Expr::Fonction(nom, args) if self.fonctions.contains_key(nom) => {
                    match self.appel(nom, args, profondeur) {
                        Ok(x) => Some(x),
                        Err(err) => {
                            erreur = Some(err);
                            Some(Expr::Indefini)
                        }
                    }
                }
                _ => None,
            }
        });

        match erreur {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }

    fn appel(&self, nom: &str, args: &[Expr], profondeur: usize) -> Result<Expr, ErreurNoyau> {
        let Some((parametres, corps)) = self.fonctions.get(nom) else {
            return Err(ErreurNoyau::FonctionInconnue(nom.to_string()));
        };
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

        let mut locales = HashMap::new();
        for (p, a) in parametres.iter().zip(args) {
            locales.insert(p.clone(), self.developper(a, profondeur)?);
        }
        self.developper(&corps.substituer(&locales), profondeur + 1)
    }
}

/// abs/floor/ceil/round/min/max sur arguments rationnels : résultat exact.
fn plier_integrees(e: &Expr) -> Expr {
    e.transformer(&mut |n: &Expr| {
        let Expr::Fonction(nom, args) = n else {
            return None;
        };
        let args: Vec<Expr> = args.iter().map(plier_integrees).collect();
        let rationnels: Option<Vec<&BigRational>> = args
            .iter()
            .map(|a| match a {
                Expr::Rat(r) => Some(r),
                _ => None,
            })
            .collect();

        let plie = match (nom.as_str(), rationnels.as_deref()) {
            ("abs", Some([r])) => Some(r.abs()),
            ("floor", Some([r])) => Some(r.floor()),
            ("ceil", Some([r])) => Some(r.ceil()),
            ("round", Some([r])) => Some(r.round()),
            ("min", Some(rs)) => rs.iter().min().map(|r| (*r).clone()),
            ("max", Some(rs)) => rs.iter().max().map(|r| (*r).clone()),
            _ => None,
        };
        Some(match plie {
            Some(r) => Expr::Rat(r),
            None => Expr::Fonction(nom.clone(), args),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse_expression;

    fn expr(s: &str) -> Expr {
        parse_expression(s).unwrap()
    }

    #[test]
    fn angles_remarquables() {
        let m = MoteurSymbolique::new();
        assert_eq!(m.simplifier("sin(pi/4)").unwrap(), "\\frac{\\sqrt{2}}{2}");
        assert_eq!(m.simplifier("cos(pi)").unwrap(), "-1");
        assert_eq!(m.simplifier("tan(pi/2)").unwrap(), "\\text{indéfini}");
    }

    #[test]
    fn lecture_decimale() {
        let m = MoteurSymbolique::new();
        assert_eq!(m.evaluer_numerique("sin(pi/4)", 6).unwrap(), "0.707107");
        assert_eq!(m.evaluer_numerique("1/3", 3).unwrap(), "0.333");
        assert_eq!(m.evaluer_numerique("2x+pi", 2).unwrap(), "3.14+2\\cdot x");
    }

    #[test]
    fn variables_et_fonctions_utilisateur() {
        let mut m = MoteurSymbolique::new();
        m.definir_variable("a", &expr("1/2")).unwrap();
        m.definir_fonction("f", &["x".to_string()], &expr("x^2+a"))
            .unwrap();
        assert_eq!(m.simplifier("f(3)").unwrap(), "\\frac{19}{2}");
        assert_eq!(m.simplifier("2a").unwrap(), "1");

        // a = a + 1 lit l’ancienne valeur
        m.definir_variable("a", &expr("a+1")).unwrap();
        assert_eq!(m.simplifier("a").unwrap(), "\\frac{3}{2}");
    }

    #[test]
    fn developpement_borne_en_profondeur() {
        let mut m = MoteurSymbolique::new();
        m.definir_variable("a", &expr("x")).unwrap();

        // chaque définition ajoute un niveau : la borne finit par refuser, sans rien lier
        let mut refus = None;
        for i in 0..IMBRICATION_MAX + 10 {
            if let Err(e) = m.definir_variable("a", &expr("sin(a)")) {
                refus = Some((i, e));
                break;
            }
        }
        let (i, e) = refus.expect("la borne d’imbrication doit refuser");
        assert_eq!(e, ErreurNoyau::TropImbriquee(IMBRICATION_MAX));
        assert!(i + 1 >= IMBRICATION_MAX - 1);
        assert!(m.variables["a"].depasse_profondeur(IMBRICATION_MAX - 1));
        assert!(!m.variables["a"].depasse_profondeur(IMBRICATION_MAX));
    }

    #[test]
    fn variables_libres_conservees() {
        let m = MoteurSymbolique::new();
        assert_eq!(m.simplifier("x+2+3").unwrap(), "x+5");
    }

    #[test]
    fn erreurs_d_appel() {
        let mut m = MoteurSymbolique::new();
        m.definir_fonction("f", &["x".to_string()], &expr("f(x)"))
            .unwrap();
        assert_eq!(
            m.simplifier("f(1)"),
            Err(ErreurNoyau::RecursionTropProfonde("f".to_string()))
        );
        assert!(matches!(
            m.simplifier("f(1,2)"),
            Err(ErreurNoyau::Arite { .. })
        ));
        assert!(m.definir_fonction("sqrt", &[], &expr("1")).is_err());
    }

    #[test]
    fn integrees_exactes() {
        let m = MoteurSymbolique::new();
        assert_eq!(m.simplifier("abs(-3/4)").unwrap(), "\\frac{3}{4}");
        assert_eq!(m.simplifier("max(1, 7/2, 2)").unwrap(), "\\frac{7}{2}");
        assert_eq!(m.simplifier("floor(-1/2)").unwrap(), "-1");
    }

    #[test]
    fn reinitialisations() {
        let mut m = MoteurSymbolique::new();
        m.definir_variable("a", &expr("2")).unwrap();
        m.definir_fonction("g", &["x".to_string()], &expr("x")).unwrap();

        m.effacer_variables();
        assert_eq!(m.simplifier("g(a)").unwrap(), "a");

        m.tout_reinitialiser();
        assert_eq!(m.simplifier("g(1)").unwrap(), "g\\left(1\\right)");
    }
}
