// ============================================================================
// Converter - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// CONCEPTS RUST :
// 1. Fonctions pures pour le layout : testables sans terminal
// 2. Traits : Frame implémente des traits pour le rendering
// 3. Builder pattern : construction fluide des widgets
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, List, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
//
// Le rendu ne modifie jamais App : il lit l'état et dessine, c'est tout.
// Le hit-testing de la souris repose sur compute_zones, la même fonction
// pure que le rendu, donc clic et affichage ne peuvent pas diverger.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, Focus, Screen, Side};
use crate::models::POPULAR_CURRENCIES;

/// Largeur d'une cellule de puce dans la grille
///
/// Fixe : la position d'une puce ne dépend que de son index et de la
/// largeur de la zone, ce qui rend le hit-testing trivial
pub const CHIP_CELL_WIDTH: u16 = 12;

/// Largeur de la colonne du bouton de swap entre les deux panneaux
const SWAP_COLUMN_WIDTH: u16 = 8;

// ============================================================================
// Zones : découpage pur de l'écran
// ============================================================================
// CONCEPT : Layout as data
// - Le rendu ET le hit-testing souris partent du même découpage
// - compute_zones est une fonction pure de Rect vers Zones
// ============================================================================

/// Les zones de l'écran convertisseur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zones {
    pub header: Rect,
    pub comparison: Rect,
    pub from_panel: Rect,
    pub swap_button: Rect,
    pub to_panel: Rect,
    pub chips: Rect,
    pub footer: Rect,
}

/// Cible d'un clic souris sur l'écran convertisseur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Le champ montant "from" (prend le focus)
    FromAmount,
    /// Le champ montant "to" (prend le focus)
    ToAmount,
    /// Le bouton d'échange de la paire
    Swap,
    /// Une puce de devise populaire, par index
    Chip(usize),
}

/// Découpe l'écran en zones (header, comparaison, panneaux, puces, footer)
///
/// CONCEPT RATATUI : Layout
/// - split() découpe un Rect en plusieurs zones
/// - Length(n) : exactement n lignes ; Min(n) : au moins n, prend le reste
///
/// La rangée des panneaux est découpée à la main : largeur de swap fixe,
/// le reste partagé en deux moitiés, pour que le résultat soit
/// entièrement déterministe
pub fn compute_zones(area: Rect) -> Zones {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : titre
            Constraint::Length(3), // Ligne de comparaison
            Constraint::Length(4), // Panneaux des montants
            Constraint::Min(3),    // Grille des puces : tout le reste
            Constraint::Length(3), // Footer : raccourcis
        ])
        .split(area);

    let panels = chunks[2];
    let swap_width = SWAP_COLUMN_WIDTH.min(panels.width);
    let side_width = panels.width.saturating_sub(swap_width) / 2;

    let from_panel = Rect {
        x: panels.x,
        y: panels.y,
        width: side_width,
        height: panels.height,
    };
    let swap_button = Rect {
        x: panels.x + side_width,
        y: panels.y,
        width: swap_width,
        height: panels.height,
    };
    let to_panel = Rect {
        x: panels.x + side_width + swap_width,
        y: panels.y,
        width: panels.width.saturating_sub(side_width + swap_width),
        height: panels.height,
    };

    Zones {
        header: chunks[0],
        comparison: chunks[1],
        from_panel,
        swap_button,
        to_panel,
        chips: chunks[3],
        footer: chunks[4],
    }
}

/// Vérifie qu'un point est dans un rectangle
fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

/// Rectangle intérieur d'une zone bordée (retire 1 cellule de chaque côté)
fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Nombre de puces par rangée pour une largeur intérieure donnée
pub fn chips_per_row(inner_width: u16) -> u16 {
    (inner_width / CHIP_CELL_WIDTH).max(1)
}

/// Puce visée par un clic dans la zone intérieure de la grille
///
/// Grille à cellules fixes : colonne = dx / largeur de cellule,
/// index = rangée * puces par rangée + colonne. Retourne None pour un
/// clic entre les cellules ou au-delà de la dernière puce.
pub fn chip_at(grid: Rect, x: u16, y: u16) -> Option<usize> {
    if !contains(grid, x, y) {
        return None;
    }

    let per_row = chips_per_row(grid.width);
    let column = (x - grid.x) / CHIP_CELL_WIDTH;
    if column >= per_row {
        return None;
    }

    let row = y - grid.y;
    let index = (row * per_row + column) as usize;
    if index < POPULAR_CURRENCIES.len() {
        Some(index)
    } else {
        None
    }
}

/// Traduit un clic en cible d'action
///
/// CONCEPT : Hit-testing pur
/// - Aucun accès au terminal : seulement le découpage et la position
pub fn hit_test(zones: &Zones, x: u16, y: u16) -> Option<ClickTarget> {
    if contains(zones.from_panel, x, y) {
        return Some(ClickTarget::FromAmount);
    }
    if contains(zones.to_panel, x, y) {
        return Some(ClickTarget::ToAmount);
    }
    if contains(zones.swap_button, x, y) {
        return Some(ClickTarget::Swap);
    }
    if contains(zones.chips, x, y) {
        return chip_at(inner(zones.chips), x, y).map(ClickTarget::Chip);
    }
    None
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Pattern matching sur app.screen
/// - Affiche le convertisseur OU le sélecteur selon l'état
/// - Le compilateur garantit l'exhaustivité (tous les cas gérés)
///
/// # Arguments
/// * `frame` - Surface de dessin ratatui
/// * `app` - État de l'application
pub fn render(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Converter => {
            render_converter(frame, app);
        }
        Screen::Picker { side } => {
            render_picker(frame, app, side);
        }
    }
}

/// Dessine l'écran convertisseur
fn render_converter(frame: &mut Frame, app: &App) {
    let zones = compute_zones(frame.size());

    render_header(frame, zones.header);
    render_comparison(frame, app, zones.comparison);
    render_amount_panel(frame, app, Side::From, zones.from_panel);
    render_swap_button(frame, zones.swap_button);
    render_amount_panel(frame, app, Side::To, zones.to_panel);
    render_chips(frame, app, zones.chips);
    render_footer(frame, app, zones.footer);
}

// ============================================================================
// Header : Titre de l'application
// ============================================================================

/// Dessine le header avec le titre
fn render_header(frame: &mut Frame, area: Rect) {
    // CONCEPT : Builder pattern
    // - Chaque méthode retourne self
    // - Permet de chaîner les appels
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" LazyChange ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(Span::styled(
        "💱 Convertisseur de devises en direct",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Ligne de comparaison : "1 USD = 90,00 RUB"
// ============================================================================

/// Dessine la ligne de comparaison entre les deux devises
fn render_comparison(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Taux ");

    // CONCEPT RATATUI : Spans multiples dans une Line
    // - La ligne principale en évidence, l'état du fetch en retrait
    let mut spans = vec![Span::styled(
        app.comparison_line(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if app.is_updating {
        spans.push(Span::styled(
            "  ⟳ mise à jour…",
            Style::default().fg(Color::Gray),
        ));
    } else if let Some(fetched_at) = app.rates.fetched_at {
        spans.push(Span::styled(
            format!("  (MàJ {})", fetched_at.format("%H:%M UTC")),
            Style::default().fg(Color::Gray),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(spans)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Panneaux des montants
// ============================================================================

/// Libellé d'une devise : "USD · Dollar américain" si elle est connue,
/// sinon juste son code
fn currency_label(code: &str) -> String {
    POPULAR_CURRENCIES
        .iter()
        .find(|c| c.code == code)
        .map(|c| format!("{} · {}", c.code, c.name))
        .unwrap_or_else(|| code.to_string())
}

/// Dessine un panneau de montant (côté from ou to)
///
/// Le panneau focalisé a une bordure jaune et un curseur bloc après le
/// texte, comme une vraie zone de saisie
fn render_amount_panel(frame: &mut Frame, app: &App, side: Side, area: Rect) {
    let (title, code, amount, focused) = match side {
        Side::From => (
            " De [f] ",
            &app.from_code,
            &app.from_input,
            app.focus == Focus::FromAmount,
        ),
        Side::To => (
            " Vers [t] ",
            &app.to_code,
            &app.to_input,
            app.focus == Focus::ToAmount,
        ),
    };

    let border_color = if focused { Color::Yellow } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let mut amount_spans = vec![Span::styled(
        amount.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if focused {
        amount_spans.push(Span::styled(
            "█", // Curseur
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    let text = vec![
        Line::from(Span::styled(
            currency_label(code),
            Style::default().fg(Color::Gray),
        )),
        Line::from(amount_spans),
    ];

    let paragraph = Paragraph::new(text).block(block);

    frame.render_widget(paragraph, area);
}

/// Dessine le bouton d'échange entre les deux panneaux
fn render_swap_button(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⇄",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("[s]", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Grille des puces de devises populaires
// ============================================================================

/// Dessine la grille des puces
///
/// Cellules de largeur fixe : l'affichage et chip_at partagent la même
/// arithmétique. La puce active (devise de base) est inversée ; celle
/// sous le curseur clavier est soulignée.
fn render_chips(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.focus == Focus::Chips {
        Color::Yellow
    } else {
        Color::Cyan
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Devises populaires ");

    let grid = inner(area);
    let per_row = chips_per_row(grid.width) as usize;

    // CONCEPT RUST : chunks() sur slice
    // - Découpe la liste des devises en rangées de per_row éléments
    let lines: Vec<Line> = POPULAR_CURRENCIES
        .chunks(per_row)
        .enumerate()
        .map(|(row, chunk)| {
            let spans: Vec<Span> = chunk
                .iter()
                .enumerate()
                .map(|(column, currency)| {
                    let index = row * per_row + column;
                    let cell = format!(
                        "{:^width$}",
                        format!("[{}]", currency.chip_label()),
                        width = CHIP_CELL_WIDTH as usize
                    );

                    let mut style = if app.chip_is_active(currency.code) {
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD)
                            .add_modifier(Modifier::REVERSED) // Inverse les couleurs
                    } else {
                        Style::default().fg(Color::White)
                    };
                    if app.focus == Focus::Chips && index == app.chip_cursor {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }

                    Span::styled(cell, style)
                })
                .collect();

            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    // CONCEPT : Confirmation de quit two-step
    // - Si app.is_awaiting_quit_confirmation(), affiche un avertissement
    // - Sinon, affiche les raccourcis normaux

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        // CONCEPT : Style avec BLINK pour attirer l'attention
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Quitter  "),
            Span::styled(
                "[Tab]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Focus  "),
            Span::styled(
                "[s]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Inverser  "),
            Span::styled(
                "[f]/[t]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Devises  "),
            Span::styled(
                "[←→]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Puces  "),
            Span::styled(
                "[r]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Rafraîchir"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Sélecteur modal de devise
// ============================================================================

/// Dessine le sélecteur de devise plein écran
///
/// CONCEPT RATATUI : List widget avec état
/// - ListState garde la ligne sélectionnée et fait défiler la liste
///   automatiquement quand elle dépasse la hauteur de l'écran
fn render_picker(frame: &mut Frame, app: &App, side: Side) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Liste des codes
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    render_header(frame, chunks[0]);

    let title = match side {
        Side::From => " Choisir la devise de base ",
        Side::To => " Choisir la devise cible ",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    // CONCEPT RUST : Iterator chaining
    // - .iter() puis .map() transforme chaque code en ListItem
    let items: Vec<ListItem> = app
        .picker_codes()
        .iter()
        .map(|code| ListItem::new(format!(" {:<6} {}", code, picker_name(code))))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.picker_index));
    frame.render_stateful_widget(list, chunks[1], &mut state);

    render_picker_footer(frame, chunks[2]);
}

/// Nom affiché à côté d'un code dans le sélecteur (vide si inconnu)
fn picker_name(code: &str) -> &'static str {
    POPULAR_CURRENCIES
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.name)
        .unwrap_or("")
}

/// Dessine le footer du sélecteur
fn render_picker_footer(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green)); // Vert : mode modal

    let help_line = Line::from(vec![
        Span::styled(
            "[↑↓ / j k]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Naviguer  "),
        Span::styled(
            "[Enter]",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Valider  "),
        Span::styled(
            "[ESC]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Annuler"),
    ]);

    let paragraph = Paragraph::new(vec![help_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    #[test]
    fn test_compute_zones_heights() {
        let zones = compute_zones(screen());

        assert_eq!(zones.header.height, 3);
        assert_eq!(zones.comparison.height, 3);
        assert_eq!(zones.from_panel.height, 4);
        assert_eq!(zones.footer.height, 3);
        // La grille des puces prend tout le reste : 24 - 3 - 3 - 4 - 3
        assert_eq!(zones.chips.height, 11);
    }

    #[test]
    fn test_compute_zones_panels_cover_width() {
        let zones = compute_zones(screen());

        assert_eq!(zones.from_panel.x, 0);
        assert_eq!(zones.swap_button.x, zones.from_panel.width);
        assert_eq!(
            zones.to_panel.x,
            zones.from_panel.width + zones.swap_button.width
        );
        assert_eq!(
            zones.from_panel.width + zones.swap_button.width + zones.to_panel.width,
            80
        );
    }

    #[test]
    fn test_chips_per_row() {
        assert_eq!(chips_per_row(78), 6);
        assert_eq!(chips_per_row(24), 2);
        // Jamais zéro, même sur un terminal minuscule
        assert_eq!(chips_per_row(5), 1);
    }

    #[test]
    fn test_chip_at_first_cell() {
        let grid = Rect::new(1, 10, 72, 5); // 6 puces par rangée

        assert_eq!(chip_at(grid, 1, 10), Some(0));
        assert_eq!(chip_at(grid, 12, 10), Some(0)); // toujours la 1re cellule
        assert_eq!(chip_at(grid, 13, 10), Some(1));
    }

    #[test]
    fn test_chip_at_second_row() {
        let grid = Rect::new(1, 10, 72, 5);

        // Rangée 1, colonne 2 : index 6 + 2
        assert_eq!(chip_at(grid, 1 + 2 * 12, 11), Some(8));
    }

    #[test]
    fn test_chip_at_out_of_bounds() {
        let grid = Rect::new(1, 10, 72, 5);

        // Hors de la grille
        assert_eq!(chip_at(grid, 0, 10), None);
        assert_eq!(chip_at(grid, 1, 9), None);

        // Rangée trop basse : index au-delà de la dernière puce
        assert_eq!(chip_at(grid, 1, 13), None);
    }

    #[test]
    fn test_chip_at_between_cells() {
        // Largeur 70 : 5 puces par rangée, les colonnes 60..70 sont mortes
        let grid = Rect::new(0, 0, 70, 5);

        assert_eq!(chip_at(grid, 59, 0), Some(4));
        assert_eq!(chip_at(grid, 65, 0), None);
    }

    #[test]
    fn test_hit_test_targets() {
        let zones = compute_zones(screen());

        let from = hit_test(&zones, zones.from_panel.x + 2, zones.from_panel.y + 1);
        assert_eq!(from, Some(ClickTarget::FromAmount));

        let swap = hit_test(&zones, zones.swap_button.x + 1, zones.swap_button.y + 1);
        assert_eq!(swap, Some(ClickTarget::Swap));

        let to = hit_test(&zones, zones.to_panel.x + 2, zones.to_panel.y + 1);
        assert_eq!(to, Some(ClickTarget::ToAmount));

        // Première puce : coin intérieur de la grille
        let chip = hit_test(&zones, zones.chips.x + 1, zones.chips.y + 1);
        assert_eq!(chip, Some(ClickTarget::Chip(0)));

        // Le header n'est pas cliquable
        assert_eq!(hit_test(&zones, 2, 0), None);
    }

    #[test]
    fn test_currency_label() {
        assert_eq!(currency_label("USD"), "USD · Dollar américain");
        // Code hors de la liste populaire : affiché tel quel
        assert_eq!(currency_label("XYZ"), "XYZ");
    }
}
