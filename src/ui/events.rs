// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier, souris et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : convertir les touches en actions
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent,
    MouseEventKind,
};

/// Période de poll de la boucle d'événements
///
/// Assez courte pour que les échéances de debounce (100ms) se résolvent
/// sans retard perceptible entre deux événements clavier
pub const TICK_RATE: Duration = Duration::from_millis(50);

// ============================================================================
// Enum Event
// ============================================================================
// CONCEPT RUST : Enums avec données
// - Chaque variant peut contenir des données différentes
// - Key(KeyEvent) : stocke l'événement clavier complet
// - Mouse(MouseEvent) : position et bouton du clic
// - Tick : variant sans données (unit variant)
// ============================================================================

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Clic souris (bouton gauche enfoncé)
    Mouse(MouseEvent),

    /// Tick régulier (debounce, rafraîchissement)
    Tick,

    /// Erreur survenue
    Error,
}

// ============================================================================
// Structure EventHandler
// ============================================================================
// CONCEPT : Singleton pattern pour gérer les événements
// - Un seul handler pour toute l'application
// - Pas besoin de stocker d'état (stateless)
// ============================================================================

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    /// Crée un nouveau gestionnaire d'événements
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(TICK_RATE) attend au plus 50ms
    /// - Si pas d'événement, retourne Ok(Event::Tick) : c'est ce tick qui
    ///   fait avancer les timers de debounce
    /// - Si événement, le lit et le convertit
    pub fn next(&self) -> Result<Event> {
        if event::poll(TICK_RATE)? {
            match event::read()? {
                // Événement clavier
                CrosstermEvent::Key(key) => {
                    // CONCEPT : Filter sur KeyEventKind
                    // Sur certains OS, on reçoit Press ET Release
                    // On ne veut gérer que Press pour éviter les doublons
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        Ok(Event::Tick)
                    }
                }

                // Seul le clic gauche nous intéresse (puces, champs, swap)
                CrosstermEvent::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        Ok(Event::Mouse(mouse))
                    } else {
                        Ok(Event::Tick)
                    }
                }

                // Autres événements (resize, etc.) ignorés pour l'instant
                _ => Ok(Event::Tick),
            }
        } else {
            // Timeout : pas d'événement, retourne Tick
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir un événement en action
// ============================================================================
// CONCEPT RUST : Pattern matching avancé
// - Match sur KeyCode pour identifier la touche
// - if let pour destructurer un seul variant
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 's' (swap de la paire)
pub fn is_swap_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('s') | KeyCode::Char('S'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'r' (rafraîchir les taux)
pub fn is_refresh_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'f' (choisir la devise de base)
pub fn is_from_picker_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('f') | KeyCode::Char('F'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 't' (choisir la devise cible)
pub fn is_to_picker_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('t') | KeyCode::Char('T'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Tab (zone de focus suivante)
pub fn is_tab_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Tab)
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Vérifie si l'événement est Espace
pub fn is_space_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(' '))
    } else {
        false
    }
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le haut ou 'k' (vim)
///
/// CONCEPT RUST : Multiple patterns avec |
/// - KeyCode::Up | KeyCode::Char('k') : match l'un ou l'autre
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche gauche ou 'h' (vim)
pub fn is_left_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche droite ou 'l' (vim)
pub fn is_right_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Vérifie si l'événement est un caractère de montant (chiffre ou
/// séparateur décimal, point ou virgule)
///
/// Les lettres ne passent jamais : elles restent disponibles pour les
/// raccourcis même quand un champ montant est focalisé
pub fn is_amount_char_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ',')
    } else {
        false
    }
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

/// Extrait la position (colonne, ligne) d'un clic gauche
pub fn left_click_position(event: &Event) -> Option<(u16, u16)> {
    if let Event::Mouse(mouse) = event {
        if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
            return Some((mouse.column, mouse.row));
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, event::KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key_event(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key_event(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_is_swap_event() {
        assert!(is_swap_event(&key_event(KeyCode::Char('s'))));
        assert!(is_swap_event(&key_event(KeyCode::Char('S'))));
        assert!(!is_swap_event(&key_event(KeyCode::Char('w'))));
    }

    #[test]
    fn test_is_amount_char_event() {
        assert!(is_amount_char_event(&key_event(KeyCode::Char('7'))));
        assert!(is_amount_char_event(&key_event(KeyCode::Char('.'))));
        assert!(is_amount_char_event(&key_event(KeyCode::Char(','))));

        // Les lettres restent des raccourcis, jamais des chiffres
        assert!(!is_amount_char_event(&key_event(KeyCode::Char('s'))));
        assert!(!is_amount_char_event(&key_event(KeyCode::Char('q'))));
        assert!(!is_amount_char_event(&key_event(KeyCode::Enter)));
    }

    #[test]
    fn test_picker_shortcuts() {
        assert!(is_from_picker_event(&key_event(KeyCode::Char('f'))));
        assert!(is_to_picker_event(&key_event(KeyCode::Char('t'))));
        assert!(!is_from_picker_event(&key_event(KeyCode::Char('t'))));
    }

    #[test]
    fn test_left_click_position() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 3,
            modifiers: event::KeyModifiers::empty(),
        };
        assert_eq!(left_click_position(&Event::Mouse(mouse)), Some((12, 3)));
        assert_eq!(left_click_position(&Event::Tick), None);
        assert_eq!(left_click_position(&key_event(KeyCode::Enter)), None);
    }
}
