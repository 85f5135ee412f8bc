// src/noyau/expr.rs
//
// AST exact (sans flottants).
// - Rat : rationnel exact
// - Pi  : symbole π
// - Indefini : résultat exact indéfini (ex: tan(π/2))
// - Var : variable symbolique (ex: x)
// - Fonction : appel nommé (intégré hors sqrt/sin/cos/tan, ou défini par l’utilisateur)
// - Implicite : produit écrit sans opérateur ("2x"), gardé pour l’affichage
//
// IMPORTANT (SAFE):
// - simplify() ne doit jamais “inventer” une valeur pour Var.
// - simplify() ne remplace jamais un appel Fonction (c’est le rôle des moteurs).

use crate::noyau::canon::canon_expr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use std::collections::HashMap;
use std::fmt;

/// Au-delà, une puissance rationnelle exacte reste symbolique (anti-gel).
const MAX_EXPOSANT: i64 = 4096;

/// Taille maximale (en bits, numérateur + dénominateur) d’une puissance pliée.
const MAX_BITS_PUISSANCE: u64 = 1 << 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Rat(BigRational),
    Pi,
    Indefini, // ex: tan(pi/2)

    Var(String),

    Sqrt(Box<Expr>),           // √(x)
    Pow(Box<Expr>, Box<Expr>), // x^y

    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),

    Fonction(String, Vec<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Implicite(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn entier(n: i64) -> Expr {
        Expr::Rat(BigRational::from_integer(BigInt::from(n)))
    }

    /// -x sous la forme historique Sub(0, x).
    pub fn oppose(x: Expr) -> Expr {
        Expr::Sub(Box::new(Expr::entier(0)), Box::new(x))
    }

    /// Canonicalisation forte (déterminisme structurel).
    /// On garde la canonisation hors de l’AST pour éviter les règles cachées.
    pub fn canon(self) -> Expr {
        canon_expr(self)
    }

    /// Simplification locale (SAFE), sans heuristiques.
    /// Objectif: réduire ce qui est strictement démontrable sans exploser l’arbre.
    pub fn simplify(self) -> Expr {
        use Expr::*;

        match self {
            // Feuilles: aucune simplification à faire
            Rat(_) | Pi | Indefini | Var(_) => self,

            Add(a, b) => {
                let a = a.simplify();
                let b = b.simplify();
                match (&a, &b) {
                    (Indefini, _) | (_, Indefini) => Indefini,
                    (Rat(x), Rat(y)) => Rat(x + y),
                    (Rat(x), _) if x.is_zero() => b,
                    (_, Rat(y)) if y.is_zero() => a,
                    _ => Add(Box::new(a), Box::new(b)),
                }
            }

            Sub(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // x - x => 0 (renforce la normalisation)
                if a == b {
                    return Rat(BigRational::zero());
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x - y),
                    (_, Rat(y)) if y.is_zero() => a,
                    // 0 - b : on garde Sub(0,b) (utile pour signes / rendu / coeff·π)
                    _ => Sub(Box::new(a), Box::new(b)),
                }
            }

            // Le produit implicite n’a d’intérêt que pour l’affichage.
            Implicite(a, b) => Mul(a, b).simplify(),

            Mul(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // √x * √x => x
                if let (Sqrt(x), Sqrt(y)) = (&a, &b) {
                    if x.as_ref() == y.as_ref() {
                        return (*x.clone()).simplify();
                    }
                }

                // √u * √v => √(u*v) si u,v rationnels >= 0
                if let (Sqrt(u), Sqrt(v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if !ru.is_negative() && !rv.is_negative() {
                            return Sqrt(Box::new(Rat(ru * rv))).simplify();
                        }
                    }
                }

                // (√x / k) * √x  et  √x * (√x / k) => x / k
                if let Some((x, k)) = sqrt_sur_k_fois_sqrt(&a, &b).or(sqrt_sur_k_fois_sqrt(&b, &a))
                {
                    return Div(Box::new(x.simplify()), Box::new(Rat(k))).simplify();
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x * y),
                    (Rat(x), _) if x.is_zero() => Rat(BigRational::zero()),
                    (_, Rat(y)) if y.is_zero() => Rat(BigRational::zero()),
                    (Rat(x), _) if x.is_one() => b,
                    (_, Rat(y)) if y.is_one() => a,
                    _ => Mul(Box::new(a), Box::new(b)),
                }
            }

            Div(a, b) => {
                let a = a.simplify();
                let b = b.simplify();

                if matches!(a, Indefini) || matches!(b, Indefini) {
                    return Indefini;
                }

                // division par zéro : on garde symbolique ici (les moteurs trancheront)
                if let Rat(y) = &b {
                    if y.is_zero() {
                        return Div(Box::new(a), Box::new(b));
                    }
                }

                // √u / √v => √(u/v) si u,v rationnels > 0
                if let (Sqrt(u), Sqrt(v)) = (&a, &b) {
                    if let (Rat(ru), Rat(rv)) = (u.as_ref(), v.as_ref()) {
                        if ru.is_positive() && rv.is_positive() {
                            return Sqrt(Box::new(Rat(ru / rv))).simplify();
                        }
                    }
                }

                match (&a, &b) {
                    (Rat(x), Rat(y)) => Rat(x / y),
                    (_, Rat(y)) if y.is_one() => a,
                    (Rat(x), _) if x.is_zero() => Rat(BigRational::zero()),

                    // (p/q) / √n  => (p/qn) * √n, si n entier > 0
                    (Rat(x), Sqrt(inner)) => {
                        if let Rat(rn) = inner.as_ref() {
                            if rn.is_positive() && rn.denom().is_one() {
                                return Mul(
                                    Box::new(Rat(x / rn)),
                                    Box::new(Sqrt(Box::new(Rat(rn.clone())))),
                                )
                                .simplify();
                            }
                        }
                        Div(Box::new(a), Box::new(b))
                    }

                    _ => Div(Box::new(a), Box::new(b)),
                }
            }

            Pow(base, exp) => {
                let base = base.simplify();
                let exp = exp.simplify();
                if matches!(base, Indefini) || matches!(exp, Indefini) {
                    return Indefini;
                }

                if let Rat(e) = &exp {
                    if e.is_zero() {
                        return Rat(BigRational::one());
                    }
                    if e.is_one() {
                        return base;
                    }
                    if *e == BigRational::new(BigInt::one(), BigInt::from(2)) {
                        return Sqrt(Box::new(base)).simplify();
                    }
                    if let (Rat(b), true) = (&base, e.denom().is_one()) {
                        if let Some(n) = e.numer().to_i64() {
                            let division_par_zero = b.is_zero() && n < 0;
                            if n.abs() <= MAX_EXPOSANT
                                && !division_par_zero
                                && puissance_raisonnable(b, n)
                            {
                                return Rat(rational_pow_int(b.clone(), n));
                            }
                        }
                    }
                }
                Pow(Box::new(base), Box::new(exp))
            }

            Sqrt(x) => {
                let x = x.simplify();
                if matches!(x, Indefini) {
                    return Indefini;
                }
                if let Rat(r) = &x {
                    if let Some(s) = rational_sqrt_exact(r) {
                        return Rat(s);
                    }
                }
                Sqrt(Box::new(x))
            }

            Sin(x) => unaire(*x, Sin),
            Cos(x) => unaire(*x, Cos),
            Tan(x) => unaire(*x, Tan),

            Fonction(nom, args) => {
                let args: Vec<Expr> = args.into_iter().map(Expr::simplify).collect();
                if args.iter().any(|a| matches!(a, Indefini)) {
                    return Indefini;
                }
                Fonction(nom, args)
            }
        }
    }

    /// Détecte si une expression contient au moins une variable.
    pub fn contient_var(&self) -> bool {
        use Expr::*;
        match self {
            Var(_) => true,
            Rat(_) | Pi | Indefini => false,
            Sqrt(x) | Sin(x) | Cos(x) | Tan(x) => x.contient_var(),
            Fonction(_, args) => args.iter().any(Expr::contient_var),
            Pow(a, b) | Add(a, b) | Sub(a, b) | Mul(a, b) | Implicite(a, b) | Div(a, b) => {
                a.contient_var() || b.contient_var()
            }
        }
    }

    /// Vrai si l’arbre a plus de `max` niveaux. Parcours itératif : ne dépend pas de la pile.
    pub fn depasse_profondeur(&self, max: usize) -> bool {
        use Expr::*;

        let mut pile: Vec<(&Expr, usize)> = vec![(self, 1)];
        while let Some((e, p)) = pile.pop() {
            if p > max {
                return true;
            }
            match e {
                Rat(_) | Pi | Indefini | Var(_) => {}
                Sqrt(x) | Sin(x) | Cos(x) | Tan(x) => pile.push((x, p + 1)),
                Fonction(_, args) => pile.extend(args.iter().map(|a| (a, p + 1))),
                Pow(a, b) | Add(a, b) | Sub(a, b) | Mul(a, b) | Implicite(a, b) | Div(a, b) => {
                    pile.push((a, p + 1));
                    pile.push((b, p + 1));
                }
            }
        }
        false
    }

    /// Remplace chaque Var liée par sa valeur (sans re-substituer dans la valeur).
    pub fn substituer(&self, liaisons: &HashMap<String, Expr>) -> Expr {
        self.transformer(&mut |e: &Expr| match e {
            Expr::Var(nom) => liaisons.get(nom).cloned(),
            _ => None,
        })
    }

    /// Réécriture descendante : `f` peut remplacer un noeud entier (sans descendre dedans),
    /// sinon on reconstruit le noeud avec ses enfants transformés.
    pub fn transformer(&self, f: &mut dyn FnMut(&Expr) -> Option<Expr>) -> Expr {
        use Expr::*;

        if let Some(remplace) = f(self) {
            return remplace;
        }

        match self {
            Rat(_) | Pi | Indefini | Var(_) => self.clone(),
            Sqrt(x) => Sqrt(Box::new(x.transformer(f))),
            Sin(x) => Sin(Box::new(x.transformer(f))),
            Cos(x) => Cos(Box::new(x.transformer(f))),
            Tan(x) => Tan(Box::new(x.transformer(f))),
            Fonction(nom, args) => {
                Fonction(nom.clone(), args.iter().map(|a| a.transformer(f)).collect())
            }
            Pow(x, y) => Pow(Box::new(x.transformer(f)), Box::new(y.transformer(f))),
            Add(x, y) => Add(Box::new(x.transformer(f)), Box::new(y.transformer(f))),
            Sub(x, y) => Sub(Box::new(x.transformer(f)), Box::new(y.transformer(f))),
            Mul(x, y) => Mul(Box::new(x.transformer(f)), Box::new(y.transformer(f))),
            Implicite(x, y) => Implicite(Box::new(x.transformer(f)), Box::new(y.transformer(f))),
            Div(x, y) => Div(Box::new(x.transformer(f)), Box::new(y.transformer(f))),
        }
    }

    /// c tel que l’expression vaut c·π, sans flottants.
    /// Domaine : Add/Sub/Mul/Div de rationnels et de π ; None dès qu’on en sort (π², sin, Var…).
    pub fn coeff_pi(&self) -> Option<BigRational> {
        match self.forme_pi(0)? {
            FormePi::Multiple(c) => Some(c),
            FormePi::Rationnel(_) => None,
        }
    }

    fn forme_pi(&self, profondeur: usize) -> Option<FormePi> {
        use Expr::*;
        use FormePi::*;

        if profondeur > PROFONDEUR_PI {
            return None;
        }
        let p = profondeur + 1;

        Some(match self {
            Pi => Multiple(BigRational::one()),
            Rat(r) => Rationnel(r.clone()),

            Add(a, b) => match (a.forme_pi(p)?, b.forme_pi(p)?) {
                (Multiple(x), Multiple(y)) => Multiple(x + y),
                (Rationnel(x), Rationnel(y)) => Rationnel(x + y),
                (Multiple(c), Rationnel(z)) | (Rationnel(z), Multiple(c)) if z.is_zero() => {
                    Multiple(c)
                }
                _ => return None,
            },
            Sub(a, b) => match (a.forme_pi(p)?, b.forme_pi(p)?) {
                (Multiple(x), Multiple(y)) => Multiple(x - y),
                (Rationnel(x), Rationnel(y)) => Rationnel(x - y),
                (Rationnel(z), Multiple(c)) if z.is_zero() => Multiple(-c),
                (Multiple(c), Rationnel(z)) if z.is_zero() => Multiple(c),
                _ => return None,
            },
            Mul(a, b) | Implicite(a, b) => match (a.forme_pi(p)?, b.forme_pi(p)?) {
                (Multiple(c), Rationnel(r)) | (Rationnel(r), Multiple(c)) => Multiple(c * r),
                (Rationnel(x), Rationnel(y)) => Rationnel(x * y),
                // π·π
                (Multiple(_), Multiple(_)) => return None,
            },
            Div(a, b) => match (a.forme_pi(p)?, b.forme_pi(p)?) {
                (Multiple(c), Rationnel(r)) if !r.is_zero() => Multiple(c / r),
                (Rationnel(x), Rationnel(y)) if !y.is_zero() => Rationnel(x / y),
                _ => return None,
            },

            // on ne pousse pas coeff·π à travers trig, racines, puissances ou appels
            Indefini | Var(_) | Sqrt(_) | Pow(_, _) | Sin(_) | Cos(_) | Tan(_) | Fonction(_, _) => {
                return None
            }
        })
    }
}

/// Au-delà, on renonce à lire un angle (arbre pathologique).
const PROFONDEUR_PI: usize = 512;

enum FormePi {
    Multiple(BigRational),
    Rationnel(BigRational),
}

fn unaire(x: Expr, ctor: fn(Box<Expr>) -> Expr) -> Expr {
    let x = x.simplify();
    if matches!(x, Expr::Indefini) {
        return Expr::Indefini;
    }
    ctor(Box::new(x))
}

/// (√x / k) * √x => Some((x, k))
fn sqrt_sur_k_fois_sqrt(a: &Expr, b: &Expr) -> Option<(Expr, BigRational)> {
    if let (Expr::Div(p, q), Expr::Sqrt(y)) = (a, b) {
        if let (Expr::Sqrt(x), Expr::Rat(k)) = (p.as_ref(), q.as_ref()) {
            if x.as_ref() == y.as_ref() && !k.is_zero() {
                return Some(((**x).clone(), k.clone()));
            }
        }
    }
    None
}

/* ------------------------ Modulo rationnel exact (sans flottants) ------------------------ */

/// Réduction modulo `periode` sur un coefficient rationnel (ex: periode=2 pour sin/cos, 1 pour tan).
/// Retourne un rationnel dans [0, periode).
///
/// Si coeff = n/d, alors coeff mod periode = (n mod (periode*d))/d.
pub(crate) fn mod_rationnel(coeff: &BigRational, periode: i64) -> BigRational {
    if periode <= 0 {
        return coeff.clone();
    }
    if coeff.is_zero() {
        return BigRational::zero();
    }

    let d = coeff.denom().clone(); // denom > 0 (num_rational)
    let n = coeff.numer().clone();

    let m = BigInt::from(periode) * &d; // periode*d  (m > 0)

    let mut r = n % &m;
    if r.is_negative() {
        r += m;
    }
    BigRational::new(r, d)
}

/* ------------------------ Affichage texte brut (journal, débogage) ------------------------ */

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;
        match self {
            Rat(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Pi => write!(f, "pi"),
            Indefini => write!(f, "indéfini"),
            Var(s) => write!(f, "{s}"),
            Sqrt(x) => write!(f, "sqrt({x})"),
            Pow(x, n) => write!(f, "({x})^({n})"),
            Sin(x) => write!(f, "sin({x})"),
            Cos(x) => write!(f, "cos({x})"),
            Tan(x) => write!(f, "tan({x})"),
            Fonction(nom, args) => {
                write!(f, "{nom}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            Add(a, b) => write!(f, "({a}+{b})"),
            Sub(a, b) => write!(f, "({a}-{b})"),
            Mul(a, b) | Implicite(a, b) => write!(f, "({a}*{b})"),
            Div(a, b) => write!(f, "({a}/{b})"),
        }
    }
}

/* ------------------------ Outils rationnels (utilisés par simplify) ------------------------ */

/// Estimation de la taille de b^n avant tout calcul : bits(b) · |n|.
fn puissance_raisonnable(b: &BigRational, n: i64) -> bool {
    let bits = b.numer().bits() + b.denom().bits();
    bits.saturating_mul(n.unsigned_abs()) <= MAX_BITS_PUISSANCE
}

pub(crate) fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp == 0 {
        return BigRational::one();
    }
    if exp < 0 {
        let pos = rational_pow_int(base, -exp);
        return BigRational::one() / pos;
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

fn rational_sqrt_exact(r: &BigRational) -> Option<BigRational> {
    if r.is_negative() {
        return None;
    }
    let sn = int_sqrt_exact(r.numer())?;
    let sd = int_sqrt_exact(r.denom())?;
    Some(BigRational::new(sn, sd))
}

fn int_sqrt_exact(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> Expr {
        Expr::Rat(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    fn var(s: &str) -> Expr {
        Expr::Var(s.to_string())
    }

    #[test]
    fn var_jamais_inventee() {
        let e = Expr::Add(Box::new(var("x")), Box::new(rat(0, 1))).simplify();
        assert_eq!(e, var("x"));
    }

    #[test]
    fn puissance_rationnelle_exacte() {
        let e = Expr::Pow(Box::new(rat(2, 3)), Box::new(rat(-2, 1))).simplify();
        assert_eq!(e, rat(9, 4));
    }

    #[test]
    fn puissance_demi_devient_racine() {
        let e = Expr::Pow(Box::new(rat(9, 1)), Box::new(rat(1, 2))).simplify();
        assert_eq!(e, rat(3, 1));
    }

    #[test]
    fn puissance_trop_grosse_reste_symbolique() {
        // 2^4000 se plie ; (10^4096)^4096 ferait ~16 millions de chiffres
        assert!(matches!(
            Expr::Pow(Box::new(rat(2, 1)), Box::new(rat(4000, 1))).simplify(),
            Expr::Rat(_)
        ));
        let base = Expr::Pow(Box::new(rat(10, 1)), Box::new(rat(4096, 1)));
        let e = Expr::Pow(Box::new(base), Box::new(rat(4096, 1))).simplify();
        match e {
            Expr::Pow(b, n) => {
                assert!(matches!(*b, Expr::Rat(_)));
                assert_eq!(*n, rat(4096, 1));
            }
            autre => panic!("attendu une puissance symbolique, reçu {autre}"),
        }
    }

    #[test]
    fn profondeur_mesuree_sans_recursion() {
        let mut e = var("x");
        for _ in 0..10 {
            e = Expr::Sin(Box::new(e));
        }
        assert!(!e.depasse_profondeur(11));
        assert!(e.depasse_profondeur(10));
        assert!(!Expr::Fonction("f".into(), vec![]).depasse_profondeur(1));
    }

    #[test]
    fn zero_puissance_negative_reste_symbolique() {
        let e = Expr::Pow(Box::new(rat(0, 1)), Box::new(rat(-1, 1))).simplify();
        assert!(matches!(e, Expr::Pow(_, _)));
    }

    #[test]
    fn implicite_se_simplifie_comme_mul() {
        let e = Expr::Implicite(Box::new(rat(2, 1)), Box::new(rat(3, 1))).simplify();
        assert_eq!(e, rat(6, 1));
    }

    #[test]
    fn substitution_simple() {
        let mut l = HashMap::new();
        l.insert("a".to_string(), rat(1, 2));
        let e = Expr::Mul(Box::new(var("a")), Box::new(var("b"))).substituer(&l);
        assert_eq!(e, Expr::Mul(Box::new(rat(1, 2)), Box::new(var("b"))));
        assert!(e.contient_var());
    }

    #[test]
    fn coeff_pi_etendu() {
        // 3π/4 - π/4 = π/2
        let trois_quarts = Expr::Div(
            Box::new(Expr::Mul(Box::new(rat(3, 1)), Box::new(Expr::Pi))),
            Box::new(rat(4, 1)),
        );
        let quart = Expr::Div(Box::new(Expr::Pi), Box::new(rat(4, 1)));
        let e = Expr::Sub(Box::new(trois_quarts), Box::new(quart));
        assert_eq!(e.coeff_pi(), Some(BigRational::new(1.into(), 2.into())));
    }

    #[test]
    fn coeff_pi_refuse_pi_carre() {
        let e = Expr::Mul(Box::new(Expr::Pi), Box::new(Expr::Pi));
        assert_eq!(e.coeff_pi(), None);
    }

    #[test]
    fn modulo_negatif() {
        let r = mod_rationnel(&BigRational::new((-1).into(), 2.into()), 2);
        assert_eq!(r, BigRational::new(3.into(), 2.into()));
    }
}
