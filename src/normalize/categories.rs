/// Weight classes, heaviest to lightest. Index `i` labels the `i`-th championship table.
pub const CATEGORY_LABELS: [&str; 18] = [
    "Heavyweight",
    "Bridgerweight",
    "Cruiserweight",
    "Light heavyweight",
    "Super middleweight",
    "Middleweight",
    "Super welterweight",
    "Welterweight",
    "Super lightweight",
    "Lightweight",
    "Super featherweight",
    "Featherweight",
    "Super bantamweight",
    "Bantamweight",
    "Super flyweight",
    "Flyweight",
    "Light flyweight",
    "Minimumweight",
];
