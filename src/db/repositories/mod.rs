mod coordinates;
mod polygon_sets;
mod study_results;
