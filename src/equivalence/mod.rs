pub mod equivalence_graph;
pub mod equivalence_table;
pub mod lemma_converter;
