// src/services/availability.rs
//
// Resolução de disponibilidade: "consigo fazer esta linha da receita com o que
// tenho na prateleira?". Tudo aqui é puro: recebe snapshots imutáveis e não
// toca no banco.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::models::cocktail::{CocktailIngredientLine, Substitute};
use crate::models::ingredient::IngredientPart;

// ---
// 1. ShelfSnapshot
// ---
// Carregado uma vez por operação e reutilizado em todas as linhas.
// `ids == None` significa "prateleira não carregada": nada fica disponível.
#[derive(Debug, Clone, Default)]
pub struct ShelfSnapshot {
    ids: Option<HashSet<Uuid>>,
}

impl ShelfSnapshot {
    pub fn new(ids: HashSet<Uuid>) -> Self {
        Self { ids: Some(ids) }
    }

    pub fn unavailable() -> Self {
        Self { ids: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.ids.is_some()
    }

    pub fn contains(&self, ingredient_id: &Uuid) -> bool {
        self.ids.as_ref().is_some_and(|ids| ids.contains(ingredient_id))
    }

    /// Ids da prateleira (vazio se não carregada).
    pub fn ids(&self) -> HashSet<Uuid> {
        self.ids.clone().unwrap_or_default()
    }
}

impl FromIterator<Uuid> for ShelfSnapshot {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---
// 2. SubstitutionGraph (linha -> substitutos aceitos)
// ---
#[derive(Debug, Clone, Default)]
pub struct SubstitutionGraph {
    by_line: HashMap<Uuid, Vec<Uuid>>,
}

impl SubstitutionGraph {
    pub fn from_substitutes<'a, I>(substitutes: I) -> Self
    where
        I: IntoIterator<Item = &'a Substitute>,
    {
        let mut by_line: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for sub in substitutes {
            let entry = by_line.entry(sub.cocktail_ingredient_id).or_default();
            if !entry.contains(&sub.ingredient_id) {
                entry.push(sub.ingredient_id);
            }
        }
        Self { by_line }
    }

    pub fn substitutes_for(&self, line_id: &Uuid) -> &[Uuid] {
        self.by_line.get(line_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---
// 3. CompoundIngredientIndex (ingrediente -> partes, um nível)
// ---
#[derive(Debug, Clone, Default)]
pub struct CompoundIngredientIndex {
    parts: HashMap<Uuid, Vec<Uuid>>,
}

impl CompoundIngredientIndex {
    pub fn from_parts<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a IngredientPart>,
    {
        let mut index: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for part in parts {
            let entry = index.entry(part.ingredient_id).or_default();
            if !entry.contains(&part.part_ingredient_id) {
                entry.push(part.part_ingredient_id);
            }
        }
        Self { parts: index }
    }

    /// Lista vazia = ingrediente simples.
    pub fn parts_of(&self, ingredient_id: &Uuid) -> &[Uuid] {
        self.parts.get(ingredient_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---
// 4. LineDescriptor
// ---
// Tudo o que a resolução precisa saber sobre uma linha, já montado a partir
// dos dois índices. Partes e substitutos são de UM nível: as partes de um
// substituto, ou as partes de uma parte, nunca entram aqui.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDescriptor {
    pub line_id: Uuid,
    pub ingredient_id: Uuid,
    pub optional: bool,
    pub substitutes: Vec<Uuid>,
    pub parts: Vec<Uuid>,
}

impl LineDescriptor {
    pub fn assemble(
        line: &CocktailIngredientLine,
        substitutes: &SubstitutionGraph,
        compounds: &CompoundIngredientIndex,
    ) -> Self {
        Self {
            line_id: line.id,
            ingredient_id: line.ingredient_id,
            optional: line.optional,
            substitutes: substitutes.substitutes_for(&line.id).to_vec(),
            parts: compounds.parts_of(&line.ingredient_id).to_vec(),
        }
    }
}

// Por qual caminho a linha ficou disponível.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "camelCase")]
pub enum Availability {
    Direct,
    #[serde(rename_all = "camelCase")]
    Substitute { ingredient_id: Uuid },
    Compound,
}

// ---
// 5. Resolução
// ---

/// Ordem fixa: direto, substituto desta linha, composto (todas as partes).
pub fn resolve(shelf: &ShelfSnapshot, line: &LineDescriptor) -> Option<Availability> {
    if shelf.contains(&line.ingredient_id) {
        return Some(Availability::Direct);
    }

    if let Some(sub) = line.substitutes.iter().find(|id| shelf.contains(id)) {
        return Some(Availability::Substitute { ingredient_id: *sub });
    }

    if !line.parts.is_empty() && line.parts.iter().all(|id| shelf.contains(id)) {
        return Some(Availability::Compound);
    }

    None
}

pub fn is_available(shelf: &ShelfSnapshot, line: &LineDescriptor) -> bool {
    resolve(shelf, line).is_some()
}

/// Linhas opcionais nunca bloqueiam.
pub fn is_makeable(shelf: &ShelfSnapshot, lines: &[LineDescriptor]) -> bool {
    lines
        .iter()
        .filter(|line| !line.optional)
        .all(|line| is_available(shelf, line))
}

// ---
// 6. Relatório por coquetel
// ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAvailability {
    pub line_id: Uuid,
    pub ingredient_id: Uuid,
    pub optional: bool,
    pub available: bool,
    pub resolution: Option<Availability>,
    /// Partes ausentes quando o ingrediente é composto e a linha não fecha.
    pub missing_parts: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub makeable: bool,
    pub missing_count: usize,
    pub lines: Vec<LineAvailability>,
}

pub fn availability_report(shelf: &ShelfSnapshot, lines: &[LineDescriptor]) -> AvailabilityReport {
    let lines: Vec<LineAvailability> = lines
        .iter()
        .map(|line| {
            let resolution = resolve(shelf, line);
            let missing_parts = match resolution {
                Some(_) => Vec::new(),
                None => line
                    .parts
                    .iter()
                    .filter(|id| !shelf.contains(id))
                    .copied()
                    .collect(),
            };
            LineAvailability {
                line_id: line.line_id,
                ingredient_id: line.ingredient_id,
                optional: line.optional,
                available: resolution.is_some(),
                resolution,
                missing_parts,
            }
        })
        .collect();

    let missing_count = lines.iter().filter(|l| !l.optional && !l.available).count();

    AvailabilityReport {
        makeable: missing_count == 0,
        missing_count,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ingredient_id: Uuid) -> LineDescriptor {
        LineDescriptor {
            line_id: Uuid::new_v4(),
            ingredient_id,
            optional: false,
            substitutes: Vec::new(),
            parts: Vec::new(),
        }
    }

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    // Definição de referência: direto OU algum substituto OU
    // (partes não vazias E todas presentes).
    fn reference(shelf: &ShelfSnapshot, line: &LineDescriptor) -> bool {
        shelf.contains(&line.ingredient_id)
            || line.substitutes.iter().any(|s| shelf.contains(s))
            || (!line.parts.is_empty() && line.parts.iter().all(|p| shelf.contains(p)))
    }

    #[test]
    fn substitute_on_shelf_makes_line_available() {
        let [gin, vodka, lime] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let shelf: ShelfSnapshot = [vodka, lime].into_iter().collect();
        let mut gin_line = line(gin);
        gin_line.substitutes = vec![vodka];

        assert_eq!(
            resolve(&shelf, &gin_line),
            Some(Availability::Substitute { ingredient_id: vodka })
        );
    }

    #[test]
    fn compound_needs_every_part() {
        let [sour_mix, lime, sugar] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut sour_line = line(sour_mix);
        sour_line.parts = vec![lime, sugar];

        let only_lime: ShelfSnapshot = [lime].into_iter().collect();
        assert!(!is_available(&only_lime, &sour_line));

        let both: ShelfSnapshot = [lime, sugar].into_iter().collect();
        assert_eq!(resolve(&both, &sour_line), Some(Availability::Compound));
    }

    #[test]
    fn direct_wins_over_other_routes() {
        let [gin, vodka] = [Uuid::new_v4(), Uuid::new_v4()];
        let shelf: ShelfSnapshot = [gin, vodka].into_iter().collect();
        let mut gin_line = line(gin);
        gin_line.substitutes = vec![vodka];
        assert_eq!(resolve(&shelf, &gin_line), Some(Availability::Direct));
    }

    #[test]
    fn ingredient_without_parts_is_not_compound() {
        let shelf = ShelfSnapshot::new(HashSet::new());
        // Partes vazias não podem ser "todas presentes".
        assert!(!is_available(&shelf, &line(Uuid::new_v4())));
    }

    #[test]
    fn unloaded_shelf_fails_closed() {
        let gin = Uuid::new_v4();
        let mut gin_line = line(gin);
        gin_line.substitutes = ids(2);
        gin_line.parts = ids(2);

        let shelf = ShelfSnapshot::unavailable();
        assert!(!shelf.is_loaded());
        assert!(!is_available(&shelf, &gin_line));
        assert!(shelf.ids().is_empty());
    }

    #[test]
    fn resolution_is_single_level() {
        // Substituto composto: as partes do substituto NÃO contam.
        let [gin, sour_mix, lime, sugar] =
            [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let part_rows = vec![
            IngredientPart { ingredient_id: sour_mix, part_ingredient_id: lime },
            IngredientPart { ingredient_id: sour_mix, part_ingredient_id: sugar },
        ];
        let index = CompoundIngredientIndex::from_parts(&part_rows);
        assert!(index.parts_of(&gin).is_empty());

        let mut gin_line = line(gin);
        gin_line.substitutes = vec![sour_mix];
        gin_line.parts = index.parts_of(&gin).to_vec();

        let shelf: ShelfSnapshot = [lime, sugar].into_iter().collect();
        assert!(!is_available(&shelf, &gin_line));
    }

    #[test]
    fn part_that_is_itself_compound_is_checked_directly() {
        // A -> {B}, B -> {C}. Com só C na prateleira, A não fecha.
        let [a, b, c] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let part_rows = vec![
            IngredientPart { ingredient_id: a, part_ingredient_id: b },
            IngredientPart { ingredient_id: b, part_ingredient_id: c },
        ];
        let index = CompoundIngredientIndex::from_parts(&part_rows);
        let mut a_line = line(a);
        a_line.parts = index.parts_of(&a).to_vec();

        let shelf: ShelfSnapshot = [c].into_iter().collect();
        assert!(!is_available(&shelf, &a_line));
    }

    #[test]
    fn cyclic_parts_terminate() {
        let [a, b] = [Uuid::new_v4(), Uuid::new_v4()];
        let part_rows = vec![
            IngredientPart { ingredient_id: a, part_ingredient_id: b },
            IngredientPart { ingredient_id: b, part_ingredient_id: a },
        ];
        let index = CompoundIngredientIndex::from_parts(&part_rows);
        let mut a_line = line(a);
        a_line.parts = index.parts_of(&a).to_vec();

        let shelf: ShelfSnapshot = [b].into_iter().collect();
        assert_eq!(resolve(&shelf, &a_line), Some(Availability::Compound));
    }

    #[test]
    fn matches_reference_definition_over_all_small_shelves() {
        // Universo pequeno: ingrediente, 2 substitutos, 2 partes e um estranho.
        let universe = ids(6);
        let mut l = line(universe[0]);
        l.substitutes = vec![universe[1], universe[2]];
        l.parts = vec![universe[3], universe[4]];

        for mask in 0u32..(1 << universe.len()) {
            let shelf: ShelfSnapshot = universe
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| *id)
                .collect();
            assert_eq!(is_available(&shelf, &l), reference(&shelf, &l), "mask {mask:b}");
        }
    }

    #[test]
    fn availability_is_monotonic_in_the_shelf() {
        let universe = ids(5);
        let mut l = line(universe[0]);
        l.substitutes = vec![universe[1]];
        l.parts = vec![universe[2], universe[3]];

        let subsets: Vec<u32> = (0u32..(1 << universe.len())).collect();
        let build = |mask: u32| -> ShelfSnapshot {
            universe
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| *id)
                .collect()
        };

        for &small in &subsets {
            for &big in &subsets {
                if small & big != small {
                    continue;
                }
                if is_available(&build(small), &l) {
                    assert!(is_available(&build(big), &l));
                }
            }
        }
    }

    #[test]
    fn repeated_evaluation_is_stable() {
        let [gin, vodka] = [Uuid::new_v4(), Uuid::new_v4()];
        let shelf: ShelfSnapshot = [vodka].into_iter().collect();
        let mut gin_line = line(gin);
        gin_line.substitutes = vec![vodka];

        let first = resolve(&shelf, &gin_line);
        for _ in 0..10 {
            assert_eq!(resolve(&shelf, &gin_line), first);
        }
    }

    #[test]
    fn optional_lines_never_block_makeability() {
        let [gin, bitters] = [Uuid::new_v4(), Uuid::new_v4()];
        let shelf: ShelfSnapshot = [gin].into_iter().collect();
        let mut bitters_line = line(bitters);
        bitters_line.optional = true;

        let lines = vec![line(gin), bitters_line];
        assert!(is_makeable(&shelf, &lines));

        let report = availability_report(&shelf, &lines);
        assert!(report.makeable);
        assert_eq!(report.missing_count, 0);
        assert!(!report.lines[1].available);
    }

    #[test]
    fn report_lists_missing_parts() {
        let [sour_mix, lime, sugar] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let mut sour_line = line(sour_mix);
        sour_line.parts = vec![lime, sugar];
        let shelf: ShelfSnapshot = [lime].into_iter().collect();

        let report = availability_report(&shelf, &[sour_line]);
        assert!(!report.makeable);
        assert_eq!(report.missing_count, 1);
        assert_eq!(report.lines[0].missing_parts, vec![sugar]);
    }

    #[test]
    fn substitution_graph_is_per_line() {
        let [line_a, line_b, vodka] = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let rows = vec![
            Substitute { id: Uuid::new_v4(), cocktail_ingredient_id: line_a, ingredient_id: vodka },
            Substitute { id: Uuid::new_v4(), cocktail_ingredient_id: line_a, ingredient_id: vodka },
        ];
        let graph = SubstitutionGraph::from_substitutes(&rows);
        assert_eq!(graph.substitutes_for(&line_a), &[vodka]);
        assert!(graph.substitutes_for(&line_b).is_empty());
    }
}
