use console::Style;
use restore_core::pipeline::config::{DeconvolutionMethod, RestoreConfig};
use restore_core::restoration::GibbsChains;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_restore_summary(config: &RestoreConfig) {
    let s = Styles::new();
    let deconv = &config.deconvolution;

    println!();
    println!("  {}", s.title.apply_to("Restore"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(7)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Deconvolution"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(&deconv.method)
    );
    print_method_params(&s, &deconv.method);
    println!(
        "    {:<12}{}",
        s.label.apply_to("PSF"),
        s.value.apply_to(&deconv.psf)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Precision"),
        s.value.apply_to(deconv.precision)
    );
    if deconv.clip {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Clip"),
            s.value.apply_to("[-1, 1]")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Clip"),
            s.disabled.apply_to("disabled")
        );
    }
    println!();
}

fn print_method_params(s: &Styles, method: &DeconvolutionMethod) {
    match method {
        DeconvolutionMethod::UnsupervisedWiener(cfg) => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Threshold"),
                s.value.apply_to(cfg.threshold)
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Min iter"),
                s.value.apply_to(cfg.min_num_iter)
            );
            match cfg.seed {
                Some(seed) => println!(
                    "    {:<12}{}",
                    s.label.apply_to("Seed"),
                    s.value.apply_to(seed)
                ),
                None => println!(
                    "    {:<12}{}",
                    s.label.apply_to("Seed"),
                    s.disabled.apply_to("random")
                ),
            }
        }
        DeconvolutionMethod::RichardsonLucy {
            filter_epsilon: None,
            ..
        } => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Epsilon"),
                s.disabled.apply_to("none")
            );
        }
        _ => {}
    }
}

pub fn print_chains_summary(chains: &GibbsChains) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Gibbs sampler"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Iterations"),
        s.value.apply_to(chains.iterations)
    );
    if chains.converged {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Stopped"),
            s.method.apply_to("converged")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Stopped"),
            s.disabled.apply_to("iteration cap")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Noise prec"),
        s.value.apply_to(format!("{:.4e}", chains.mean_noise_precision()))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Prior prec"),
        s.value.apply_to(format!("{:.4e}", chains.mean_prior_precision()))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Balance"),
        s.value.apply_to(format!("{:.4e}", chains.balance()))
    );
    println!();
}
