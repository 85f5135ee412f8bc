//! Tests fuzz safe : l’aperçu et les commandes sous saisie arbitraire.
//!
//! But : marteler la couche application sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - longueurs bornées
//! - budget temps global
//! - invariants clés :
//!   * l’aperçu ne panique jamais et ne modifie rien
//!   * commande refusée => historique inchangé ; acceptée => une ligne de plus, brouillon vide
//!   * le curseur de rappel reste dans [None, len-1]

use std::time::{Duration, Instant};

use super::etat::{AppCalc, Evenement, Mode, APERCU_INDISPONIBLE};
use super::navigation::Direction;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération de saisies (bornée) ------------------------ */

/// Morceaux plausibles + débris : la saisie “en cours de frappe” est rarement valide.
const MORCEAUX: &[&str] = &[
    "1", "2", "7", "0", "0.5", "x", "a", "f", "pi", "π", "e", "sqrt(", "√", "sin(", "cos(",
    "tan(", "ln(", "min(", "(", ")", ")", "+", "-", "*", "/", "^", ",", "=", ":=", ":", ":1",
    ":2", ":0", " ", "²", "#", "{", "\\", "f(x)", "abc",
];

fn gen_saisie(rng: &mut Rng, longueur_max: u32) -> String {
    let n = rng.pick(longueur_max + 1);
    (0..n)
        .map(|_| MORCEAUX[rng.pick(MORCEAUX.len() as u32) as usize])
        .collect()
}

/// Commandes numériques surtout valides, avec références de ligne.
fn gen_commande(rng: &mut Rng) -> String {
    let atome = |rng: &mut Rng| match rng.pick(6) {
        0 => format!("{}", rng.pick(20)),
        1 => format!("{}/{}", rng.pick(9), 1 + rng.pick(8)),
        2 => format!(":{}", rng.pick(6)),
        3 => "pi".to_string(),
        4 => "a".to_string(),
        _ => format!("sqrt({})", rng.pick(50)),
    };
    match rng.pick(5) {
        0 => format!("a={}", atome(rng)),
        1 => format!("{}+{}", atome(rng), atome(rng)),
        2 => format!("{}*({}-{})", atome(rng), atome(rng), atome(rng)),
        3 => format!("{}^{}", atome(rng), rng.pick(4)),
        _ => atome(rng),
    }
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_apercu_jamais_de_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut app = AppCalc::default();

    let mut vus_ok = 0usize;
    let mut vus_indispo = 0usize;

    for k in 0..400 {
        budget(t0, max);

        if k == 200 {
            app.traiter(Evenement::BasculerMode);
        }
        let saisie = gen_saisie(&mut rng, 8);
        app.traiter(Evenement::Saisie(saisie.clone()));

        let a = app.apercu_affichable();
        // même saisie => même aperçu, et l’aperçu n’a rien laissé derrière lui
        assert_eq!(a, app.apercu_affichable(), "saisie={saisie:?}");
        assert!(app.etat().historique.is_empty());
        assert!(!app.adaptateur.numerique().est_lie("a"));
        assert!(!app.adaptateur.numerique().est_lie("f"));

        if a == APERCU_INDISPONIBLE {
            vus_indispo += 1;
        } else {
            vus_ok += 1;
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(vus_ok > 10, "trop peu d’aperçus: {vus_ok}");
    assert!(vus_indispo > 10, "aucun aperçu refusé: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_commandes_tout_ou_rien() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    let mut rng = Rng::new(0xBADC0DE_u64);
    let mut app = AppCalc::default();

    let mut acceptees = 0usize;
    let mut refusees = 0usize;

    for _ in 0..250 {
        budget(t0, max);

        let commande = gen_commande(&mut rng);
        let avant = app.numerique.historique.len();
        app.traiter(Evenement::Saisie(commande.clone()));

        if app.traiter(Evenement::Executer) {
            assert_eq!(app.numerique.historique.len(), avant + 1, "{commande:?}");
            assert!(app.numerique.brouillon.is_empty());
            assert!(app.erreur.is_none());
            acceptees += 1;
        } else {
            assert_eq!(app.numerique.historique.len(), avant, "{commande:?}");
            assert_eq!(app.numerique.brouillon, commande);
            assert!(app.erreur.is_some());
            refusees += 1;
        }

        // de temps en temps : suppression d’une ligne au hasard
        if rng.pick(10) == 0 && !app.numerique.historique.is_empty() {
            let i = rng.pick(app.numerique.historique.len() as u32) as usize;
            assert!(app.traiter(Evenement::Supprimer(i)));
        }
    }

    assert!(app.algebrique.historique.is_empty());
    assert!(acceptees > 50, "trop peu de commandes acceptées: {acceptees}");
    assert!(refusees > 0, "aucune commande refusée: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_rappel_borne() {
    let t0 = Instant::now();
    let max = Duration::from_millis(1000);

    let mut rng = Rng::new(0x5EED_u64);
    let mut app = AppCalc::default();

    for k in 0..12 {
        app.traiter(Evenement::Saisie(format!("{k}+1")));
        assert!(app.traiter(Evenement::Executer));
    }
    app.traiter(Evenement::Saisie("brouillon".into()));

    for _ in 0..300 {
        budget(t0, max);

        let direction = if rng.coin() {
            Direction::PlusAncien
        } else {
            Direction::PlusRecent
        };
        app.traiter(Evenement::Rappel(direction));

        let etat = app.etat();
        match etat.navigateur.curseur() {
            None => assert_eq!(etat.brouillon, "brouillon"),
            Some(i) => {
                assert!(i < etat.historique.saisies().len());
                assert_eq!(etat.brouillon, etat.historique.saisies()[i]);
            }
        }
    }

    // on redescend jusqu’au brouillon
    while app.traiter(Evenement::Rappel(Direction::PlusRecent)) {
        budget(t0, max);
    }
    assert_eq!(app.numerique.brouillon, "brouillon");
    assert_eq!(app.mode, Mode::Numerique);
}

#[test]
fn fuzz_safe_saisies_geantes() {
    let t0 = Instant::now();
    let max = Duration::from_millis(3000);

    const N: usize = 100_000;
    let moins = format!("{}1", "-".repeat(N));
    let somme = vec!["1"; N].join("+");
    let parentheses = format!("{}1{}", "(".repeat(N), ")".repeat(N));

    for mode in [Mode::Numerique, Mode::Algebrique] {
        let mut app = AppCalc::default();
        app.traiter(Evenement::ChoisirMode(mode));

        for saisie in [&moins, &somme] {
            budget(t0, max);
            app.traiter(Evenement::Saisie(saisie.clone()));
            assert_eq!(app.apercu_affichable(), APERCU_INDISPONIBLE, "{mode:?}");
            assert!(!app.traiter(Evenement::Executer));
            assert!(app.etat().historique.is_empty());
        }

        budget(t0, max);
        app.traiter(Evenement::Saisie(parentheses.clone()));
        assert_eq!(app.apercu_affichable(), "1", "{mode:?}");
        assert!(app.traiter(Evenement::Executer));
        assert_eq!(app.etat().historique.len(), 1);
    }
}
