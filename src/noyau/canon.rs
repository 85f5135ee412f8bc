// src/noyau/canon.rs
//
// Forme canonique (déterministe)
// ------------------------------
// - sommes : aplaties, constante rationnelle regroupée et placée en dernier
// - produits : aplatis, signe et rationnels regroupés en un coefficient de tête
// - ordre total entre termes (rang puis structure), donc sortie stable
// - reconstruction : `a - b` plutôt que `a + (-b)`
// - √n entier : carrés parfaits sortis (√12 = 2·√3)
//
// Rien d’autre : pas d’identités trig, les Fonction ne sont jamais réécrites.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::noyau::expr::Expr;

/// Plus grand diviseur essayé pour sortir les carrés de √n.
const LIMITE_ESSAIS: u32 = 10_000;

pub fn canon_expr(e: Expr) -> Expr {
    use Expr::*;

    let b = |x: Box<Expr>| Box::new(canon_expr(*x));

    match e {
        Rat(_) | Pi | Indefini | Var(_) => e,

        Sqrt(x) => racine(canon_expr(*x)),
        Pow(x, n) => puissance(canon_expr(*x), canon_expr(*n)),

        Sin(x) => Sin(b(x)),
        Cos(x) => Cos(b(x)),
        Tan(x) => Tan(b(x)),
        Fonction(nom, args) => Fonction(nom, args.into_iter().map(canon_expr).collect()),

        Add(_, _) | Sub(_, _) => {
            let mut s = Somme::default();
            s.ajouter(e, false);
            s.construire()
        }
        Mul(x, y) | Implicite(x, y) => {
            let mut p = Produit::default();
            p.ajouter(canon_expr(*x));
            p.ajouter(canon_expr(*y));
            p.construire()
        }
        Div(x, y) => quotient(canon_expr(*x), canon_expr(*y)),
    }
}

/* ------------------------ Signes ------------------------ */

fn est_rat(e: &Expr, pred: impl Fn(&BigRational) -> bool) -> bool {
    matches!(e, Expr::Rat(r) if pred(r))
}

fn zero() -> Expr {
    Expr::Rat(BigRational::zero())
}

/// `-e` sous forme canonique : rationnel négé, `0 - x` sinon.
fn oppose(e: Expr) -> Expr {
    match e {
        Expr::Rat(r) => Expr::Rat(-r),
        Expr::Sub(a, b) if est_rat(&a, Zero::is_zero) => *b,
        autre => Expr::Sub(Box::new(zero()), Box::new(autre)),
    }
}

/// (négatif ?, valeur absolue). Reconnaît -r, 0 - x et un produit à coefficient négatif.
fn signe(e: Expr) -> (bool, Expr) {
    match e {
        Expr::Rat(r) if r.is_negative() => (true, Expr::Rat(-r)),
        Expr::Sub(a, b) if est_rat(&a, Zero::is_zero) => (true, *b),
        Expr::Mul(..) => match produit_sans_signe(&e) {
            Some(abs) => (true, abs),
            None => (false, e),
        },
        autre => (false, autre),
    }
}

/// Produit gauche dont la feuille de tête est un rationnel négatif : même produit, coefficient positif.
fn produit_sans_signe(e: &Expr) -> Option<Expr> {
    let Expr::Mul(a, b) = e else { return None };
    match a.as_ref() {
        Expr::Rat(r) if r.is_negative() => {
            let c = -r.clone();
            Some(if c.is_one() {
                (**b).clone()
            } else {
                Expr::Mul(Box::new(Expr::Rat(c)), b.clone())
            })
        }
        Expr::Mul(..) => produit_sans_signe(a).map(|t| Expr::Mul(Box::new(t), b.clone())),
        _ => None,
    }
}

/* ------------------------ Ordre total ------------------------ */

fn rang(e: &Expr) -> u8 {
    use Expr::*;
    match e {
        Rat(_) => 0,
        Var(_) => 1,
        Sqrt(_) => 2,
        Pi => 3,
        Pow(_, _) => 4,
        Sin(_) | Cos(_) | Tan(_) | Fonction(_, _) => 5,
        Mul(_, _) | Implicite(_, _) | Div(_, _) => 6,
        Add(_, _) | Sub(_, _) => 7,
        Indefini => u8::MAX,
    }
}

/// Départage à rang égal : variante, nom, valeur.
fn etiquette(e: &Expr) -> (u8, &str, Option<&BigRational>) {
    use Expr::*;
    match e {
        Rat(r) => (0, "", Some(r)),
        Var(nom) => (0, nom.as_str(), None),
        Cos(_) => (0, "cos", None),
        Sin(_) => (2, "sin", None),
        Tan(_) => (3, "tan", None),
        Fonction(nom, _) => (1, nom.as_str(), None),
        Mul(_, _) | Implicite(_, _) | Add(_, _) => (0, "", None),
        Div(_, _) | Sub(_, _) => (1, "", None),
        Sqrt(_) | Pi | Pow(_, _) | Indefini => (0, "", None),
    }
}

fn enfants(e: &Expr) -> Vec<&Expr> {
    use Expr::*;
    match e {
        Rat(_) | Pi | Indefini | Var(_) => Vec::new(),
        Sqrt(x) | Sin(x) | Cos(x) | Tan(x) => vec![x],
        Pow(a, b) | Add(a, b) | Sub(a, b) | Mul(a, b) | Implicite(a, b) | Div(a, b) => {
            vec![a, b]
        }
        Fonction(_, args) => args.iter().collect(),
    }
}

fn ordre(a: &Expr, b: &Expr) -> Ordering {
    rang(a)
        .cmp(&rang(b))
        .then_with(|| etiquette(a).cmp(&etiquette(b)))
        .then_with(|| {
            let (ea, eb) = (enfants(a), enfants(b));
            ea.iter()
                .zip(&eb)
                .map(|(x, y)| ordre(x, y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| ea.len().cmp(&eb.len()))
        })
}

/* ------------------------ Sommes ------------------------ */

struct Somme {
    constante: BigRational,
    termes: Vec<Expr>,
}

impl Default for Somme {
    fn default() -> Self {
        Self {
            constante: BigRational::zero(),
            termes: Vec::new(),
        }
    }
}

impl Somme {
    /// Aplatit Add/Sub ; les sous-termes sont canonisés au passage.
    fn ajouter(&mut self, e: Expr, negatif: bool) {
        match e {
            Expr::Add(a, b) => {
                self.ajouter(*a, negatif);
                self.ajouter(*b, negatif);
            }
            Expr::Sub(a, b) => {
                self.ajouter(*a, negatif);
                self.ajouter(*b, !negatif);
            }
            autre => match canon_expr(autre) {
                // une somme canonisée (ex. sous un produit développé) se ré-aplatit
                s @ (Expr::Add(..) | Expr::Sub(..)) if !est_oppose(&s) => self.ajouter(s, negatif),
                Expr::Rat(r) if negatif => self.constante -= r,
                Expr::Rat(r) => self.constante += r,
                t if negatif => self.termes.push(oppose(t)),
                t => self.termes.push(t),
            },
        }
    }

    fn construire(mut self) -> Expr {
        self.termes.sort_by(ordre);
        if !self.constante.is_zero() {
            self.termes.push(Expr::Rat(self.constante));
        }

        let mut it = self.termes.into_iter();
        let Some(premier) = it.next() else {
            return zero();
        };
        it.fold(premier, |acc, t| match signe(t) {
            (true, abs) => Expr::Sub(Box::new(acc), Box::new(abs)),
            (false, t) => Expr::Add(Box::new(acc), Box::new(t)),
        })
    }
}

/// `0 - x` : un terme opposé, pas une somme à aplatir.
fn est_oppose(e: &Expr) -> bool {
    matches!(e, Expr::Sub(a, _) if est_rat(a, Zero::is_zero))
}

/* ------------------------ Produits ------------------------ */

struct Produit {
    coeff: BigRational,
    facteurs: Vec<Expr>,
    indefini: bool,
}

impl Default for Produit {
    fn default() -> Self {
        Self {
            coeff: BigRational::one(),
            facteurs: Vec::new(),
            indefini: false,
        }
    }
}

impl Produit {
    /// Facteur déjà canonique : aplatit Mul, sort signe et rationnels.
    fn ajouter(&mut self, e: Expr) {
        match e {
            Expr::Mul(a, b) => {
                self.ajouter(*a);
                self.ajouter(*b);
            }
            Expr::Indefini => self.indefini = true,
            autre => {
                let (negatif, abs) = signe(autre);
                if negatif {
                    self.coeff = -self.coeff.clone();
                }
                match abs {
                    Expr::Rat(r) => self.coeff *= r,
                    f => self.facteurs.push(f),
                }
            }
        }
    }

    fn construire(mut self) -> Expr {
        if self.indefini {
            return Expr::Indefini;
        }
        if self.coeff.is_zero() {
            return zero();
        }

        self.facteurs.sort_by(ordre);
        if !self.coeff.is_one() || self.facteurs.is_empty() {
            self.facteurs.insert(0, Expr::Rat(self.coeff));
        }

        let mut it = self.facteurs.into_iter();
        match it.next() {
            Some(premier) => it.fold(premier, |acc, f| Expr::Mul(Box::new(acc), Box::new(f))),
            None => Expr::Rat(BigRational::one()),
        }
    }
}

/* ------------------------ Quotients, puissances, racines ------------------------ */

fn quotient(num: Expr, den: Expr) -> Expr {
    if matches!(num, Expr::Indefini) || matches!(den, Expr::Indefini) {
        return Expr::Indefini;
    }
    if est_rat(&den, One::is_one) {
        return num;
    }
    // 0/b reste 0, même si b = 0 : la division par zéro est traitée par simplify
    if est_rat(&num, Zero::is_zero) {
        return zero();
    }

    // a/(-b) => (-a)/b
    match signe(den) {
        (true, abs) => Expr::Div(Box::new(oppose(num)), Box::new(abs)),
        (false, den) => Expr::Div(Box::new(num), Box::new(den)),
    }
}

fn puissance(base: Expr, exp: Expr) -> Expr {
    if matches!(base, Expr::Indefini) || matches!(exp, Expr::Indefini) {
        return Expr::Indefini;
    }
    if est_rat(&exp, Zero::is_zero) {
        return Expr::Rat(BigRational::one());
    }
    if est_rat(&exp, One::is_one) {
        return base;
    }
    Expr::Pow(Box::new(base), Box::new(exp))
}

fn racine(x: Expr) -> Expr {
    let n = match x {
        Expr::Indefini => return Expr::Indefini,
        Expr::Rat(ref r) if r.is_zero() => return zero(),
        Expr::Rat(ref r) if r.is_positive() && r.denom().is_one() => r.numer().clone(),
        autre => return Expr::Sqrt(Box::new(autre)),
    };

    let (s, t) = extraire_carres(&n);
    let entier = |v: BigInt| Expr::Rat(BigRational::from_integer(v));
    match (s.is_one(), t.is_one()) {
        (_, true) => entier(s),
        (true, false) => Expr::Sqrt(Box::new(entier(t))),
        (false, false) => Expr::Mul(Box::new(entier(s)), Box::new(Expr::Sqrt(Box::new(entier(t))))),
    }
}

/// n = s²·t par essais de diviseurs (bornés) ; au-delà de la borne, t peut garder des carrés.
fn extraire_carres(n: &BigInt) -> (BigInt, BigInt) {
    let mut reste = n.clone();
    let mut s = BigInt::one();

    let mut p: u32 = 2;
    while p <= LIMITE_ESSAIS && BigInt::from(p) * p <= reste {
        let carre = BigInt::from(p * p);
        while (&reste % &carre).is_zero() {
            reste /= &carre;
            s *= p;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    (s, reste)
}
