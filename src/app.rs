// src/app.rs
//
// Calculatrice à aperçu — module App (racine)
// -------------------------------------------
// Rôle:
// - Déclarer les sous-modules (état, historique, rappel, prétraitement, adaptateur, vue, réglages)
// - Ré-exporter AppCalc + Reglages (pour main.rs)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Raccourcis globaux ici (Échap, Ctrl+M, F1) ; Enter et ↑/↓ restent dans vue.rs,
// là où l’on sait si le champ a le focus.

pub mod adaptateur;
pub mod erreurs;
pub mod etat;
pub mod historique;
pub mod navigation;
pub mod pretraitement;
pub mod reglages;
pub mod vue;

#[cfg(test)]
mod tests_fuzz_safe;

pub use etat::{AppCalc, Evenement};
pub use reglages::Reglages;

use eframe::egui;

impl eframe::App for AppCalc {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.raccourcis(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}

impl AppCalc {
    fn raccourcis(&mut self, ctx: &egui::Context) {
        // consommées ici : le champ de saisie ne les voit pas
        let esc = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));
        let bascule = ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL, egui::Key::M));
        let aide = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::F1));

        if esc {
            self.traiter(Evenement::EffacerBrouillon);
        }
        if bascule {
            self.traiter(Evenement::BasculerMode);
        }
        if aide {
            self.traiter(Evenement::BasculerAide);
        }
    }
}
