#[cfg(test)]
mod render {
    mod integration;
}

#[cfg(test)]
mod sweep {
    mod integration;
}
